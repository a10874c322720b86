//! General configs and proxy settings

use serde_json::{json, Value};
use syncpanel_core::domain::ProxySettings;
use syncpanel_core::ports::IAgentApi;
use wiremock::{
    matchers::{body_partial_json, method, path},
    Mock, ResponseTemplate,
};

use crate::common;

#[tokio::test]
async fn test_general_configs_are_normalized() {
    let (server, client) = common::setup_agent_mock().await;
    common::mount_get(
        &server,
        "/general_configs",
        200,
        json!({"update_info": {"enable_update_check": "true", "update_check_frequency_days": 1}}),
    )
    .await;

    let configs = client.general_configs().await.expect("general configs");
    assert_eq!(
        configs.get_path("update_info.enable_update_check"),
        Some(&Value::Bool(true))
    );
}

#[tokio::test]
async fn test_update_general_configs_posts_document() {
    let (server, client) = common::setup_agent_mock().await;
    common::mount_get(
        &server,
        "/general_configs",
        200,
        json!({"log_configuration": {"log_levels": "INFO"}}),
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/general_configs"))
        .and(body_partial_json(json!({"log_configuration": {"log_levels": "DEBUG"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "log_configuration": {"log_levels": "DEBUG"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut configs = client.general_configs().await.expect("general configs");
    configs.set_path("log_configuration.log_levels", json!("DEBUG"));
    let updated = client
        .update_general_configs(&configs)
        .await
        .expect("update");
    assert_eq!(
        updated.get_path("log_configuration.log_levels"),
        Some(&json!("DEBUG"))
    );
}

#[tokio::test]
async fn test_proxy_round_trip() {
    let (server, client) = common::setup_agent_mock().await;
    Mock::given(method("POST"))
        .and(path("/proxy"))
        .and(body_partial_json(json!({"http": {"hostname": "proxy.local"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "http": {"hostname": "proxy.local", "port": "3128"}
        })))
        .mount(&server)
        .await;

    let mut proxy = ProxySettings::default();
    proxy.set_path("http.hostname", json!("proxy.local"));
    let saved = client.update_proxy(&proxy).await.expect("update proxy");
    assert_eq!(saved.get_path("http.port"), Some(&json!("3128")));
}
