use anyhow::{Context, Result};
use pushrelay_core::ProviderConfig;

const ENV_API_KEY: &str = "PUSHRELAY_API_KEY";
const ENV_AUTH_DOMAIN: &str = "PUSHRELAY_AUTH_DOMAIN";
const ENV_PROJECT_ID: &str = "PUSHRELAY_PROJECT_ID";
const ENV_STORAGE_BUCKET: &str = "PUSHRELAY_STORAGE_BUCKET";
const ENV_SENDER_ID: &str = "PUSHRELAY_SENDER_ID";
const ENV_APP_ID: &str = "PUSHRELAY_APP_ID";
const ENV_ENDPOINT: &str = "PUSHRELAY_ENDPOINT";

pub(crate) fn provider_config_from_env() -> Result<ProviderConfig> {
    Ok(ProviderConfig {
        api_key: required_var(ENV_API_KEY)?,
        auth_domain: required_var(ENV_AUTH_DOMAIN)?,
        project_id: required_var(ENV_PROJECT_ID)?,
        storage_bucket: required_var(ENV_STORAGE_BUCKET)?,
        messaging_sender_id: required_var(ENV_SENDER_ID)?,
        app_id: required_var(ENV_APP_ID)?,
    })
}

fn required_var(name: &str) -> Result<String> {
    std::env::var(name).with_context(|| format!("missing environment variable {name}"))
}

/// 解析推送服务端点: 命令行参数 > 环境变量 > auth_domain 推导
pub(crate) fn resolve_endpoint(flag: Option<&str>, config: &ProviderConfig) -> String {
    flag.map(str::to_string)
        .or_else(|| std::env::var(ENV_ENDPOINT).ok())
        .unwrap_or_else(|| format!("https://{}", config.auth_domain))
}

pub(crate) fn mask(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    format!("{visible}****")
}
