// Infrastructure layer modules
pub mod cloudformation_ops;
pub mod config;
pub mod iam_ops;
pub mod lambda_ops;
pub mod logging;
pub mod response_sender;
pub mod s3_ops;

#[cfg(test)]
pub(crate) mod mocks;

// Re-exports
pub use cloudformation_ops::{AwsCloudFormationOps, CloudFormationOps, CloudFormationOpsError};
pub use config::{ConfigError, CustomResourceConfig};
pub use iam_ops::{AwsIamOps, IamOps, IamOpsError};
pub use lambda_ops::{AwsLambdaOps, LambdaOps, LambdaOpsError};
pub use logging::init_logging;
pub use response_sender::{HttpResponseSender, ResponseSendError, ResponseSender};
pub use s3_ops::{AwsS3Ops, S3Ops, S3OpsError};
