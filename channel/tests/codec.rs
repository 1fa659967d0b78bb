use std::time::Duration;

use geokit_channel::sys::UnsupportedPlatform;
use geokit_channel::{
    ChannelConfig, DEFAULT_CHANNEL_NAME, ErrorCode, LocationChannel, Method, MethodCall,
    MethodResult,
};
use geokit_location::Priority;
use serde_json::{Value, json};

#[test]
fn method_names_match_the_host() {
    let names: Vec<_> = Method::ALL.iter().map(|method| method.name()).collect();
    assert_eq!(
        names,
        [
            "getCurrentLocationWithAddress",
            "requestLocationPermission",
            "isLocationServiceEnabled",
            "openLocationSettings",
        ]
    );
    for method in Method::ALL {
        assert_eq!(Method::from_name(method.name()), Some(method));
    }
    assert_eq!(Method::from_name("GetCurrentLocationWithAddress"), None);
}

#[test]
fn call_envelope_arguments_are_optional() {
    let call = MethodCall::decode(r#"{"method":"openLocationSettings"}"#).unwrap();
    assert_eq!(call, MethodCall::from(Method::OpenLocationSettings));

    let call =
        MethodCall::decode(r#"{"method":"isLocationServiceEnabled","arguments":{"x":1}}"#).unwrap();
    assert_eq!(call.arguments, json!({"x": 1}));

    assert!(MethodCall::decode(r#"{"arguments":null}"#).is_err());
}

#[test]
fn result_envelopes() {
    let encoded = MethodResult::error(ErrorCode::LocationDisabled, "Location services are disabled")
        .encode()
        .unwrap();
    assert_eq!(
        serde_json::from_str::<Value>(&encoded).unwrap(),
        json!({
            "status": "error",
            "code": "LOCATION_DISABLED",
            "message": "Location services are disabled",
            "details": null,
        })
    );

    let encoded = MethodResult::success(Value::Null).encode().unwrap();
    assert_eq!(
        serde_json::from_str::<Value>(&encoded).unwrap(),
        json!({"status": "success", "value": null})
    );
}

#[test]
fn error_codes_serialize_as_their_wire_names() {
    for code in [
        ErrorCode::PermissionDenied,
        ErrorCode::LocationDisabled,
        ErrorCode::LocationError,
        ErrorCode::SettingsError,
    ] {
        assert_eq!(serde_json::to_value(code).unwrap(), json!(code.as_str()));
    }
}

#[test]
fn config_defaults() {
    let config = ChannelConfig::default();
    assert_eq!(config.channel_name, DEFAULT_CHANNEL_NAME);
    assert_eq!(config.permission_request_code, 1001);
    assert!(config.await_permission_result);
    assert_eq!(config.fix_timeout(), Some(Duration::from_secs(30)));
    assert_eq!(config.geocoder_locale, None);
    assert_eq!(config.request.priority, Priority::HighAccuracy);

    assert_eq!(ChannelConfig::from_json("{}").unwrap(), config);
}

#[test]
fn config_overrides() {
    let config = ChannelConfig::from_json(
        r#"{
            "channelName": "acme/location",
            "awaitPermissionResult": false,
            "fixTimeoutMs": null,
            "geocoderLocale": "de-DE",
            "request": {"priority": "lowPower", "numUpdates": 1}
        }"#,
    )
    .unwrap();

    assert_eq!(config.channel_name, "acme/location");
    assert!(!config.await_permission_result);
    assert_eq!(config.fix_timeout(), None);
    assert_eq!(config.geocoder_locale.as_deref(), Some("de-DE"));
    assert_eq!(config.request.priority, Priority::LowPower);
    assert_eq!(config.request.interval_ms, 10_000);

    assert!(ChannelConfig::from_json(r#"{"permissionRequestCode":"x"}"#).is_err());
}

#[tokio::test]
async fn unsupported_platform_answers_without_location() {
    let platform = UnsupportedPlatform;
    let channel = LocationChannel::new(
        ChannelConfig::default(),
        platform,
        platform,
        platform,
        platform,
    );
    assert_eq!(channel.name(), "safe_voice/location");

    assert_eq!(
        channel.handle(Method::GetCurrentLocationWithAddress.into()).await,
        MethodResult::error(ErrorCode::PermissionDenied, "Location permission not granted")
    );
    assert_eq!(
        channel.handle(Method::RequestLocationPermission.into()).await,
        MethodResult::success(false)
    );
    assert_eq!(
        channel.handle(Method::IsLocationServiceEnabled.into()).await,
        MethodResult::success(false)
    );
    assert_eq!(
        channel
            .handle(Method::OpenLocationSettings.into())
            .await
            .error_code(),
        Some(ErrorCode::SettingsError)
    );
}
