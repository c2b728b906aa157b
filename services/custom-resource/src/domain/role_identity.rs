//! Lambda実行ロールの名前とパス
//!
//! ロール名はスタック名・関数名・スタックUUIDの先頭8文字から作る。
//! IAMのロール名は64文字までなので、超える場合はスタック名を切り詰める。

use thiserror::Error;

use super::stack_arn::StackArn;

/// IAMロール名の最大長
pub const MAX_ROLE_NAME_LENGTH: usize = 64;

/// ロール名に含めるスタックUUIDの長さ
const STACK_UUID_PREFIX_LENGTH: usize = 8;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RoleIdentityError {
    #[error("関数名が長すぎてロール名を作れません: {0}")]
    FunctionNameTooLong(String),
}

/// ロールの名前とパス
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleIdentity {
    pub name: String,
    pub path: String,
}

impl RoleIdentity {
    /// スタック内の関数に対するロールを決める
    pub fn for_function(stack: &StackArn, function_name: &str) -> Result<Self, RoleIdentityError> {
        let uuid_prefix: String = stack
            .stack_uuid()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .take(STACK_UUID_PREFIX_LENGTH)
            .collect();
        let suffix = format!("-{}-{}", function_name, uuid_prefix);

        // スタック名が最低1文字は残ること
        if suffix.len() >= MAX_ROLE_NAME_LENGTH {
            return Err(RoleIdentityError::FunctionNameTooLong(function_name.to_string()));
        }

        let available = MAX_ROLE_NAME_LENGTH - suffix.len();
        let stack_part: String = stack.stack_name().chars().take(available).collect();
        let name = format!("{}{}", stack_part, suffix);

        let path = match stack.resource_group_info() {
            Some(info) => format!(
                "/{}/{}/{}/{}/",
                info.project_name, info.deployment_name, info.resource_group_name, function_name
            ),
            None => format!("/{}/{}/", stack.stack_name(), function_name),
        };

        Ok(Self { name, path })
    }
}

/// IAMのロール名として使える文字列か
///
/// 使える文字は英数字と `+=,.@_-` のみ。
pub fn is_valid_role_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_ROLE_NAME_LENGTH
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "+=,.@_-".contains(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack(name: &str) -> StackArn {
        StackArn::parse(&format!(
            "arn:aws:cloudformation:us-east-1:123456789012:stack/{}/0f1e2d3c-aaaa-bbbb-cccc-1234567890ab",
            name
        ))
        .unwrap()
    }

    #[test]
    fn test_resource_group_stack() {
        let identity = RoleIdentity::for_function(&stack("TestProject-TestDeployment-TestGroup"), "TestFunction").unwrap();

        assert_eq!(identity.name, "TestProject-TestDeployment-TestGroup-TestFunction-0f1e2d3c");
        assert_eq!(identity.path, "/TestProject/TestDeployment/TestGroup/TestFunction/");
    }

    #[test]
    fn test_plain_stack() {
        let identity = RoleIdentity::for_function(&stack("Standalone"), "Main").unwrap();

        assert_eq!(identity.name, "Standalone-Main-0f1e2d3c");
        assert_eq!(identity.path, "/Standalone/Main/");
    }

    #[test]
    fn test_long_stack_name_is_truncated() {
        let long_name = "A".repeat(100);
        let identity = RoleIdentity::for_function(&stack(&long_name), "Function").unwrap();

        assert_eq!(identity.name.len(), MAX_ROLE_NAME_LENGTH);
        assert!(identity.name.ends_with("-Function-0f1e2d3c"));
        assert!(identity.name.starts_with("AAAA"));
    }

    #[test]
    fn test_same_inputs_give_same_identity() {
        let a = RoleIdentity::for_function(&stack("S"), "F").unwrap();
        let b = RoleIdentity::for_function(&stack("S"), "F").unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn test_generated_names_are_valid() {
        let identity = RoleIdentity::for_function(&stack(&"B".repeat(80)), "Main").unwrap();
        assert!(is_valid_role_name(&identity.name));
    }

    #[test]
    fn test_is_valid_role_name() {
        assert!(is_valid_role_name("MyGame-Dev-DontDie-Main-0f1e2d3c"));
        assert!(is_valid_role_name("a+b=c,d.e@f_g"));
        assert!(!is_valid_role_name(""));
        assert!(!is_valid_role_name("2026/10/19/[$LATEST]0123abcd"));
        assert!(!is_valid_role_name(&"a".repeat(65)));
    }

    #[test]
    fn test_function_name_too_long() {
        let function = "F".repeat(60);
        let result = RoleIdentity::for_function(&stack("S"), &function);

        assert_eq!(result, Err(RoleIdentityError::FunctionNameTooLong(function)));
    }
}
