// アプリケーション層モジュール
pub mod custom_resource_service;
pub mod dispatcher;
pub mod lambda_configuration_handler;
pub mod plugin;
pub mod populate_bucket_handler;
pub mod resource_handler;
pub mod role_reconciler;

// 再エクスポート
pub use custom_resource_service::CustomResourceService;
pub use dispatcher::{DispatchError, Dispatcher};
pub use lambda_configuration_handler::{LAMBDA_CONFIGURATION_RESOURCE_TYPE, LambdaConfigurationHandler};
pub use plugin::{
    DirectoryPluginLoader, LambdaPluginHandler, PluginError, PluginLoader, PluginManifest, PluginRegistry,
    manifest_file_name,
};
pub use populate_bucket_handler::{POPULATE_MAIN_BUCKET_RESOURCE_TYPE, PopulateBucketHandler};
pub use resource_handler::{HandlerError, HandlerOutcome, ResourceHandler};
pub use role_reconciler::{CreatedRole, RoleReconciler};
