use msgraph_beta_models::models::{
    AccessReviewSettings, AndroidManagedStoreApp, AnyAccessReviewSettings,
    AnyAndroidManagedStoreApp, AnyDeviceManagementSettingCategory, AnyEntity, AnyMobileApp,
    MobileApp, MobileAppInstallStatus, ResultantAppState, WebApp,
};
use msgraph_beta_models::serialization::{
    deserialize_from_json, serialize_to_json, AdditionalDataHolder, ParseNode, Parsable,
};
use msgraph_beta_models::SerializationError;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use test_log::test;

fn node(value: Value) -> ParseNode {
    ParseNode::new(value)
}

#[test]
fn known_discriminator_selects_subtype() {
    let app = AnyMobileApp::create_from_discriminator_value(Some(&node(json!({
        "@odata.type": "#microsoft.graph.androidManagedStoreWebApp",
        "id": "app-1",
        "displayName": "Portal",
        "isPrivate": true,
        "appStoreUrl": "https://play.google.com/store/apps/details?id=portal",
    }))))
    .unwrap();

    match &app {
        AnyMobileApp::AndroidManagedStoreWebApp(web_app) => {
            let store_app = web_app.android_managed_store_app();
            assert_eq!(store_app.is_private(), Some(true));
            assert_eq!(store_app.mobile_app().display_name(), Some("Portal"));
            assert_eq!(store_app.mobile_app().entity().id(), Some("app-1"));
        }
        other => panic!("expected an android managed store web app, got {other:?}"),
    }
    assert_eq!(app.mobile_app().display_name(), Some("Portal"));
    assert_eq!(
        app.odata_type(),
        Some("#microsoft.graph.androidManagedStoreWebApp")
    );
    assert!(app.additional_data().is_empty());
}

#[test]
fn missing_discriminator_gives_base_type() {
    let app = AnyMobileApp::create_from_discriminator_value(Some(&node(json!({
        "displayName": "Untyped",
    }))))
    .unwrap();
    match app {
        AnyMobileApp::MobileApp(app) => {
            assert_eq!(app.display_name(), Some("Untyped"));
            assert_eq!(app.odata_type(), None);
        }
        other => panic!("expected the base type, got {other:?}"),
    }
}

#[test]
fn base_discriminator_gives_base_type() {
    let app = AnyMobileApp::create_from_discriminator_value(Some(&node(json!({
        "@odata.type": "#microsoft.graph.mobileApp",
        "publisher": "Contoso",
    }))))
    .unwrap();
    assert!(matches!(app, AnyMobileApp::MobileApp(_)));
    assert_eq!(app.mobile_app().publisher(), Some("Contoso"));
}

#[test]
fn unknown_discriminator_falls_back_and_keeps_members() {
    let app = AnyMobileApp::create_from_discriminator_value(Some(&node(json!({
        "@odata.type": "#microsoft.graph.winGetApp",
        "displayName": "Terminal",
        "packageIdentifier": "9N0DX20HK701",
    }))))
    .unwrap();
    let AnyMobileApp::MobileApp(base) = &app else {
        panic!("expected the base type, got {app:?}");
    };
    assert_eq!(base.odata_type(), Some("#microsoft.graph.winGetApp"));
    assert_eq!(base.display_name(), Some("Terminal"));
    assert_eq!(
        base.additional_data().get("packageIdentifier"),
        Some(&json!("9N0DX20HK701"))
    );

    let written: Value = serde_json::from_slice(&serialize_to_json(&app).unwrap()).unwrap();
    assert_eq!(
        written,
        json!({
            "@odata.type": "#microsoft.graph.winGetApp",
            "displayName": "Terminal",
            "packageIdentifier": "9N0DX20HK701",
        })
    );
}

#[test]
fn missing_node_gives_new_base() {
    let app = AnyMobileApp::create_from_discriminator_value(None).unwrap();
    assert_eq!(app, AnyMobileApp::MobileApp(MobileApp::new()));
    assert_eq!(app, AnyMobileApp::default());
}

#[test]
fn non_string_discriminator_is_an_error() {
    let result = AnyMobileApp::create_from_discriminator_value(Some(&node(json!({
        "@odata.type": 7,
    }))));
    assert!(matches!(
        result,
        Err(SerializationError::UnexpectedType {
            expected: "string",
            ..
        })
    ));
}

#[test]
fn family_fields_dispatch_when_nested() {
    let status: MobileAppInstallStatus = deserialize_from_json(
        br##"{
            "@odata.type": "#microsoft.graph.mobileAppInstallStatus",
            "deviceName": "LAPTOP-1",
            "installState": "installed",
            "app": {
                "@odata.type": "#microsoft.graph.webApp",
                "displayName": "Intranet",
                "appUrl": "https://intranet.contoso.com",
                "useManagedBrowser": true
            }
        }"##,
    )
    .unwrap();
    assert_eq!(status.install_state(), Some(ResultantAppState::Installed));
    match status.app() {
        Some(AnyMobileApp::WebApp(web_app)) => {
            assert_eq!(web_app.app_url(), Some("https://intranet.contoso.com"));
            assert_eq!(web_app.use_managed_browser(), Some(true));
            assert_eq!(web_app.mobile_app().display_name(), Some("Intranet"));
        }
        other => panic!("expected a web app, got {other:?}"),
    }

    let written: Value = serde_json::from_slice(&serialize_to_json(&status).unwrap()).unwrap();
    assert_eq!(written["app"]["@odata.type"], json!("#microsoft.graph.webApp"));
    assert_eq!(written["app"]["appUrl"], json!("https://intranet.contoso.com"));
}

#[test]
fn family_collections_hold_mixed_variants() {
    let apps: Vec<AnyMobileApp> = serde_json::from_value(json!([
        {"@odata.type": "#microsoft.graph.webApp", "appUrl": "https://a"},
        {"@odata.type": "#microsoft.graph.windowsStoreApp", "appStoreUrl": "https://b"},
        {"@odata.type": "#microsoft.graph.androidForWorkApp", "packageId": "com.contoso"},
        {"displayName": "plain"},
    ]))
    .unwrap();
    assert!(matches!(apps[0], AnyMobileApp::WebApp(_)));
    assert!(matches!(apps[1], AnyMobileApp::WindowsStoreApp(_)));
    assert!(matches!(apps[2], AnyMobileApp::AndroidForWorkApp(_)));
    assert!(matches!(apps[3], AnyMobileApp::MobileApp(_)));

    let via_node = node(json!([{"@odata.type": "#microsoft.graph.webApp"}]))
        .get_collection_of_object_values::<AnyMobileApp>()
        .unwrap()
        .unwrap();
    assert!(matches!(via_node[0], AnyMobileApp::WebApp(_)));
}

#[test]
fn intermediate_family_only_knows_its_own_subtypes() {
    let web_app = json!({
        "@odata.type": "#microsoft.graph.androidManagedStoreWebApp",
        "packageId": "com.contoso.web",
    });
    let app = AnyAndroidManagedStoreApp::create_from_discriminator_value(Some(&node(web_app)))
        .unwrap();
    assert!(matches!(app, AnyAndroidManagedStoreApp::AndroidManagedStoreWebApp(_)));
    assert_eq!(app.android_managed_store_app().package_id(), Some("com.contoso.web"));

    // a sibling type is not a subtype of androidManagedStoreApp
    let sibling = json!({"@odata.type": "#microsoft.graph.webApp", "packageId": "x"});
    let app = AnyAndroidManagedStoreApp::create_from_discriminator_value(Some(&node(sibling)))
        .unwrap();
    assert!(matches!(app, AnyAndroidManagedStoreApp::AndroidManagedStoreApp(_)));
    assert_eq!(
        AnyAndroidManagedStoreApp::DISCRIMINATOR_VALUES,
        &["#microsoft.graph.androidManagedStoreWebApp"]
    );
    assert_eq!(
        AnyAndroidManagedStoreApp::default(),
        AnyAndroidManagedStoreApp::AndroidManagedStoreApp(AndroidManagedStoreApp::new())
    );
}

#[test]
fn entity_family_reaches_every_resource() {
    let entity: AnyEntity = serde_json::from_value(json!({
        "@odata.type": "#microsoft.graph.customer",
        "id": "c1",
        "displayName": "Acme",
    }))
    .unwrap();
    match &entity {
        AnyEntity::Customer(customer) => assert_eq!(customer.display_name(), Some("Acme")),
        other => panic!("expected a customer, got {other:?}"),
    }
    assert_eq!(entity.entity().id(), Some("c1"));

    let entity: AnyEntity = serde_json::from_value(json!({
        "@odata.type": "#microsoft.graph.androidManagedStoreWebApp",
        "id": "a1",
    }))
    .unwrap();
    assert!(matches!(entity, AnyEntity::AndroidManagedStoreWebApp(_)));
    assert_eq!(entity.entity().id(), Some("a1"));
}

#[test]
fn base_view_is_mutable() {
    let mut entity = AnyEntity::from(WebApp::new());
    entity.entity_mut().set_id(Some("w1".to_string()));
    let AnyEntity::WebApp(web_app) = &entity else {
        panic!("expected a web app, got {entity:?}");
    };
    assert_eq!(web_app.mobile_app().entity().id(), Some("w1"));
    assert_eq!(entity.odata_type(), Some("#microsoft.graph.webApp"));
}

#[test]
fn complex_type_family() {
    let settings = AnyAccessReviewSettings::create_from_discriminator_value(Some(&node(json!({
        "@odata.type": "#microsoft.graph.businessFlowSettings",
        "durationInDays": 14,
        "mailNotificationsEnabled": true,
        "autoReviewSettings": {"notReviewedResult": "Deny"},
        "escalation": "manager",
    }))))
    .unwrap();
    let AnyAccessReviewSettings::BusinessFlowSettings(flow) = &settings else {
        panic!("expected business flow settings, got {settings:?}");
    };
    assert_eq!(flow.duration_in_days(), Some(14));
    assert_eq!(flow.access_review_settings().mail_notifications_enabled(), Some(true));
    assert_eq!(
        settings
            .access_review_settings()
            .auto_review_settings()
            .and_then(|auto| auto.not_reviewed_result()),
        Some("Deny")
    );
    assert_eq!(settings.additional_data().get("escalation"), Some(&json!("manager")));

    let plain = AnyAccessReviewSettings::create_from_discriminator_value(None).unwrap();
    assert_eq!(plain, AnyAccessReviewSettings::AccessReviewSettings(AccessReviewSettings::new()));
    assert_eq!(plain.odata_type(), None);
}

#[test]
fn setting_category_family() {
    let categories = node(json!([
        {
            "@odata.type": "#microsoft.graph.deviceManagementIntentSettingCategory",
            "displayName": "Intent",
        },
        {
            "@odata.type": "#microsoft.graph.deviceManagementTemplateSettingCategory",
            "hasRequiredSetting": true,
        },
    ]))
    .get_collection_of_object_values::<AnyDeviceManagementSettingCategory>()
    .unwrap()
    .unwrap();
    assert!(matches!(
        categories[0],
        AnyDeviceManagementSettingCategory::DeviceManagementIntentSettingCategory(_)
    ));
    assert_eq!(
        categories[0].device_management_setting_category().display_name(),
        Some("Intent")
    );
    assert_eq!(
        categories[1]
            .device_management_setting_category()
            .has_required_setting(),
        Some(true)
    );
}
