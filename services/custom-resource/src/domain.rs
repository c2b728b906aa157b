// Domain layer modules
pub mod arn_template;
pub mod bucket_seed;
pub mod function_access;
pub mod policy;
pub mod policy_builder;
pub mod properties;
pub mod resource_event;
pub mod response;
pub mod role_identity;
pub mod stack_arn;

// Re-exports
pub use arn_template::{ArnTemplateError, resolve_arn};
pub use bucket_seed::{BUCKET_SEED, SeedObject, populate_bucket_physical_id};
pub use function_access::{FunctionAccessEntry, FunctionAccessError};
pub use policy::{FUNCTION_ACCESS_POLICY_NAME, PolicyDocument, PolicyStatement, lambda_trust_policy};
pub use policy_builder::{PolicyBuildError, StackResource, build_function_policy};
pub use properties::{PropertyError, ResourceProperties};
pub use resource_event::{RequestType, ResourceEvent};
pub use response::{CustomResourceResponse, ResponseStatus};
pub use role_identity::{RoleIdentity, RoleIdentityError, is_valid_role_name};
pub use stack_arn::{ResourceGroupInfo, StackArn, StackArnError};
