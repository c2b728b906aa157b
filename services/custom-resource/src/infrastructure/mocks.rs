//! テスト用のモック操作実装
//!
//! 各`*Ops`トレイトのインメモリ実装。呼び出し履歴を記録し、
//! 指定した操作を失敗させられる。

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{CustomResourceResponse, StackResource};
use crate::infrastructure::{
    CloudFormationOps, CloudFormationOpsError, IamOps, IamOpsError, LambdaOps, LambdaOpsError, ResponseSendError,
    ResponseSender, S3Ops, S3OpsError,
};

/// モック上のロール
#[derive(Debug, Clone)]
pub struct MockRole {
    pub arn: String,
    pub path: String,
    pub assume_role_policy: String,
    pub policies: BTreeMap<String, String>,
}

/// インメモリのIAM
#[derive(Default)]
pub struct MockIamOps {
    roles: Mutex<HashMap<String, MockRole>>,
    /// 呼び出し履歴（"CreateRole:name" 形式）
    calls: Mutex<Vec<String>>,
    /// 失敗させる操作名
    fail_on: Mutex<Option<&'static str>>,
}

impl MockIamOps {
    pub fn new() -> Self {
        Self::default()
    }

    /// 指定した操作（"CreateRole"など）を失敗させる
    pub fn fail_on(&self, operation: &'static str) {
        *self.fail_on.lock().unwrap() = Some(operation);
    }

    pub fn role(&self, name: &str) -> Option<MockRole> {
        self.roles.lock().unwrap().get(name).cloned()
    }

    pub fn role_count(&self) -> usize {
        self.roles.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, operation: &'static str, target: &str) -> Result<(), IamOpsError> {
        self.calls.lock().unwrap().push(format!("{}:{}", operation, target));
        if *self.fail_on.lock().unwrap() == Some(operation) {
            return Err(IamOpsError::AwsSdkError(format!("mock {} failure", operation)));
        }
        Ok(())
    }
}

#[async_trait]
impl IamOps for MockIamOps {
    async fn create_role(&self, role_name: &str, path: &str, assume_role_policy: &str) -> Result<String, IamOpsError> {
        self.record("CreateRole", role_name)?;
        let mut roles = self.roles.lock().unwrap();
        if roles.contains_key(role_name) {
            return Err(IamOpsError::AwsSdkError(format!("EntityAlreadyExists: {}", role_name)));
        }
        let arn = format!("arn:aws:iam::123456789012:role{}{}", path, role_name);
        roles.insert(
            role_name.to_string(),
            MockRole {
                arn: arn.clone(),
                path: path.to_string(),
                assume_role_policy: assume_role_policy.to_string(),
                policies: BTreeMap::new(),
            },
        );
        Ok(arn)
    }

    async fn get_role_arn(&self, role_name: &str) -> Result<Option<String>, IamOpsError> {
        self.record("GetRole", role_name)?;
        Ok(self.roles.lock().unwrap().get(role_name).map(|r| r.arn.clone()))
    }

    async fn put_role_policy(
        &self,
        role_name: &str,
        policy_name: &str,
        policy_document: &str,
    ) -> Result<(), IamOpsError> {
        self.record("PutRolePolicy", role_name)?;
        let mut roles = self.roles.lock().unwrap();
        let role = roles
            .get_mut(role_name)
            .ok_or_else(|| IamOpsError::NotFound(role_name.to_string()))?;
        role.policies.insert(policy_name.to_string(), policy_document.to_string());
        Ok(())
    }

    async fn delete_role_policy(&self, role_name: &str, policy_name: &str) -> Result<(), IamOpsError> {
        self.record("DeleteRolePolicy", role_name)?;
        let mut roles = self.roles.lock().unwrap();
        let role = roles
            .get_mut(role_name)
            .ok_or_else(|| IamOpsError::NotFound(role_name.to_string()))?;
        role.policies
            .remove(policy_name)
            .map(|_| ())
            .ok_or_else(|| IamOpsError::NotFound(format!("{}/{}", role_name, policy_name)))
    }

    async fn delete_role(&self, role_name: &str) -> Result<(), IamOpsError> {
        self.record("DeleteRole", role_name)?;
        let mut roles = self.roles.lock().unwrap();
        match roles.get(role_name) {
            None => Err(IamOpsError::NotFound(role_name.to_string())),
            Some(role) if !role.policies.is_empty() => {
                Err(IamOpsError::AwsSdkError(format!("DeleteConflict: {}", role_name)))
            }
            Some(_) => {
                roles.remove(role_name);
                Ok(())
            }
        }
    }
}

/// 固定のリソース一覧を返すCloudFormation
#[derive(Default)]
pub struct MockCloudFormationOps {
    resources: Mutex<Vec<StackResource>>,
    call_count: AtomicUsize,
}

impl MockCloudFormationOps {
    pub fn new(resources: Vec<StackResource>) -> Self {
        Self {
            resources: Mutex::new(resources),
            call_count: AtomicUsize::new(0),
        }
    }

    /// スタック更新を模してリソース一覧を差し替える
    pub fn set_resources(&self, resources: Vec<StackResource>) {
        *self.resources.lock().unwrap() = resources;
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CloudFormationOps for MockCloudFormationOps {
    async fn describe_stack_resources(&self, _stack_id: &str) -> Result<Vec<StackResource>, CloudFormationOpsError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        Ok(self.resources.lock().unwrap().clone())
    }
}

/// インメモリのS3
#[derive(Default)]
pub struct MockS3Ops {
    objects: Mutex<BTreeMap<(String, String), String>>,
    calls: Mutex<Vec<String>>,
    /// このキーへの操作を失敗させる
    fail_key: Mutex<Option<String>>,
}

impl MockS3Ops {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_on_key(&self, key: &str) {
        *self.fail_key.lock().unwrap() = Some(key.to_string());
    }

    pub fn insert(&self, bucket: &str, key: &str, body: &str) {
        self.objects
            .lock()
            .unwrap()
            .insert((bucket.to_string(), key.to_string()), body.to_string());
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<String> {
        self.objects
            .lock()
            .unwrap()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, operation: &str, bucket: &str, key: &str) -> Result<(), S3OpsError> {
        self.calls.lock().unwrap().push(format!("{}:{}", operation, key));
        if self.fail_key.lock().unwrap().as_deref() == Some(key) {
            return Err(S3OpsError::AwsSdkError {
                bucket: bucket.to_string(),
                key: key.to_string(),
                message: "mock failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl S3Ops for MockS3Ops {
    async fn put_object(&self, bucket: &str, key: &str, body: &str) -> Result<(), S3OpsError> {
        self.record("PutObject", bucket, key)?;
        self.insert(bucket, key, body);
        Ok(())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), S3OpsError> {
        self.record("DeleteObject", bucket, key)?;
        self.objects
            .lock()
            .unwrap()
            .remove(&(bucket.to_string(), key.to_string()));
        Ok(())
    }
}

/// 固定の応答を返すLambda
pub struct MockLambdaOps {
    response: Result<Value, String>,
    invocations: Mutex<Vec<(String, Value)>>,
}

impl MockLambdaOps {
    pub fn returning(response: Value) -> Self {
        Self {
            response: Ok(response),
            invocations: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error_type: &str) -> Self {
        Self {
            response: Err(error_type.to_string()),
            invocations: Mutex::new(Vec::new()),
        }
    }

    pub fn invocations(&self) -> Vec<(String, Value)> {
        self.invocations.lock().unwrap().clone()
    }
}

#[async_trait]
impl LambdaOps for MockLambdaOps {
    async fn invoke(&self, function_name: &str, payload: &Value) -> Result<Value, LambdaOpsError> {
        self.invocations
            .lock()
            .unwrap()
            .push((function_name.to_string(), payload.clone()));
        match &self.response {
            Ok(value) => Ok(value.clone()),
            Err(error_type) => Err(LambdaOpsError::FunctionError {
                function_name: function_name.to_string(),
                error_type: error_type.clone(),
                payload: r#"{"errorMessage":"mock"}"#.to_string(),
            }),
        }
    }
}

/// 送信された応答を記録する
#[derive(Default)]
pub struct MockResponseSender {
    sent: Mutex<Vec<(String, CustomResourceResponse)>>,
    fail: bool,
}

impl MockResponseSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<(String, CustomResourceResponse)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResponseSender for MockResponseSender {
    async fn send(&self, response_url: &str, response: &CustomResourceResponse) -> Result<(), ResponseSendError> {
        self.sent
            .lock()
            .unwrap()
            .push((response_url.to_string(), response.clone()));
        if self.fail {
            return Err(ResponseSendError::HttpError("mock connection refused".to_string()));
        }
        Ok(())
    }
}
