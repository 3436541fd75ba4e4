use serde_json::json;

use crate::directory::Directory;
use crate::types::record::{ConfigBlock, IdentityProviderRecord, PosixProfile};

pub fn run_provider_tests(db: &Directory) {
    let mut corp = IdentityProviderRecord {
        provider: "corp".to_string(),
        disabled: false,
        ipv4_allow_list: vec![],
        module: Some("cognito".to_string()),
        module_config: json!({
            "cognito_client_id": "client",
            "cognito_user_pool_region": "us-east-1",
        })
        .as_object()
        .cloned()
        .unwrap(),
        config: ConfigBlock {
            policy: Some("{}".to_string()),
            posix_profile: Some(PosixProfile {
                uid: 1000,
                gid: 1000,
                secondary_gids: vec![10, 20],
            }),
            ..Default::default()
        },
    };
    let fallback = IdentityProviderRecord {
        provider: "$default$".to_string(),
        disabled: true,
        ipv4_allow_list: vec!["172.16.0.0/12".to_string()],
        module: None,
        module_config: Default::default(),
        config: ConfigBlock::default(),
    };

    db.with_transaction(|tx| {
        tx.put_provider(&corp)?;
        tx.put_provider(&fallback)?;
        Ok(())
    })
    .unwrap();

    db.with_transaction(|tx| {
        assert_eq!(tx.get_provider("corp").unwrap().unwrap(), corp);
        assert_eq!(tx.get_provider("$default$").unwrap().unwrap(), fallback);
        assert!(tx.get_provider("missing").unwrap().is_none());

        let all = tx.list_providers().unwrap();
        let names: Vec<_> = all.iter().map(|p| p.provider.as_str()).collect();
        assert_eq!(names, vec!["$default$", "corp"]);
        Ok(())
    })
    .unwrap();

    corp.disabled = true;
    db.with_transaction(|tx| {
        tx.put_provider(&corp)?;
        assert!(tx.get_provider("corp").unwrap().unwrap().disabled);

        assert!(tx.delete_provider("corp").unwrap());
        assert!(!tx.delete_provider("corp").unwrap());
        assert_eq!(tx.list_providers().unwrap().len(), 1);
        Ok(())
    })
    .unwrap();
}
