//! Account manager against the in-memory stores.
//!
//! Covers the account lifecycle end to end: creation, login checks, profile
//! and password updates, flag changes and deletion.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use profiles_auth::{
        AccountChanges, AccountError, AccountManager, AccountStore, FlagChanges, HashingParams,
        PasswordHasher, Principal, TokenStore,
    };
    use profiles_core::{AccountId, DomainError};

    use crate::store::{InMemoryAccountStore, InMemoryTokenStore};

    fn setup() -> (AccountManager, Arc<InMemoryAccountStore>) {
        let store = Arc::new(InMemoryAccountStore::new());
        let hasher = PasswordHasher::new(HashingParams {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap();
        (AccountManager::new(store.clone(), hasher), store)
    }

    fn field_errors(err: AccountError) -> profiles_core::FieldErrors {
        match err {
            AccountError::Domain(DomainError::Validation(fields)) => fields,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn create_account_hashes_password_and_sets_defaults() {
        let (manager, _) = setup();
        let account = manager
            .create_account("a@x.com", "A", Some("secret123"))
            .await
            .unwrap();

        assert_eq!(account.email, "a@x.com");
        assert_eq!(account.name, "A");
        assert_ne!(account.password_hash.as_str(), "secret123");
        assert!(account.is_active);
        assert!(!account.is_staff);
        assert!(!account.is_superuser);
        assert!(manager.hasher().verify("secret123", &account.password_hash));
    }

    #[tokio::test]
    async fn create_account_normalizes_email() {
        let (manager, _) = setup();
        let account = manager
            .create_account("  Bob@EXAMPLE.Org ", "Bob", Some("pw"))
            .await
            .unwrap();
        assert_eq!(account.email, "Bob@example.org");
    }

    #[tokio::test]
    async fn empty_email_rejected_and_nothing_stored() {
        let (manager, store) = setup();
        let err = manager.create_account("", "A", Some("pw")).await.unwrap_err();
        let fields = field_errors(err);
        assert_eq!(
            fields.get("email").unwrap(),
            ["Users must have an email address".to_string()]
        );
        assert!(store.list(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_email_is_a_field_error() {
        let (manager, _) = setup();
        manager.create_account("a@x.com", "A", Some("pw")).await.unwrap();
        let err = manager
            .create_account("a@X.COM", "Other", Some("pw"))
            .await
            .unwrap_err();
        assert!(field_errors(err).get("email").is_some());
    }

    #[tokio::test]
    async fn privileged_account_has_both_flags() {
        let (manager, _) = setup();
        let admin = manager
            .create_privileged_account("root@x.com", "Root", "rootpw")
            .await
            .unwrap();
        assert!(admin.is_staff);
        assert!(admin.is_superuser);
        assert!(admin.is_active);
    }

    #[tokio::test]
    async fn account_without_password_cannot_log_in() {
        let (manager, _) = setup();
        let account = manager.create_account("np@x.com", "NP", None).await.unwrap();
        assert!(!account.password_hash.is_usable());

        let err = manager.authenticate("np@x.com", "").await.unwrap_err();
        assert!(matches!(err, AccountError::InvalidCredentials));
    }

    #[tokio::test]
    async fn authenticate_checks_password_and_activity() {
        let (manager, _) = setup();
        let mut account = manager
            .create_account("a@x.com", "A", Some("secret123"))
            .await
            .unwrap();

        let ok = manager.authenticate("a@X.com", "secret123").await.unwrap();
        assert_eq!(ok.id, account.id);

        assert!(matches!(
            manager.authenticate("a@x.com", "wrong").await,
            Err(AccountError::InvalidCredentials)
        ));
        assert!(matches!(
            manager.authenticate("nobody@x.com", "secret123").await,
            Err(AccountError::InvalidCredentials)
        ));

        let root = Principal {
            account_id: AccountId::new(999),
            is_staff: true,
            is_superuser: true,
        };
        manager
            .set_flags(
                &root,
                &mut account,
                FlagChanges {
                    is_active: Some(false),
                    ..FlagChanges::default()
                },
            )
            .await
            .unwrap();
        assert!(matches!(
            manager.authenticate("a@x.com", "secret123").await,
            Err(AccountError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn update_password_replaces_hash() {
        let (manager, store) = setup();
        let mut account = manager
            .create_account("a@x.com", "A", Some("old"))
            .await
            .unwrap();
        manager.update_password(&mut account, "new").await.unwrap();

        let stored = store.get(account.id).await.unwrap().unwrap();
        assert!(manager.hasher().verify("new", &stored.password_hash));
        assert!(!manager.hasher().verify("old", &stored.password_hash));
    }

    #[tokio::test]
    async fn update_profile_is_partial() {
        let (manager, store) = setup();
        let mut account = manager
            .create_account("a@x.com", "A", Some("pw"))
            .await
            .unwrap();

        manager
            .update_profile(
                &mut account,
                AccountChanges {
                    name: Some("Renamed".into()),
                    ..AccountChanges::default()
                },
            )
            .await
            .unwrap();

        let stored = store.get(account.id).await.unwrap().unwrap();
        assert_eq!(stored.name, "Renamed");
        assert_eq!(stored.email, "a@x.com");
        assert!(manager.hasher().verify("pw", &stored.password_hash));
    }

    #[tokio::test]
    async fn update_profile_rejects_taken_email() {
        let (manager, store) = setup();
        manager.create_account("a@x.com", "A", Some("pw")).await.unwrap();
        let mut b = manager
            .create_account("b@x.com", "B", Some("pw"))
            .await
            .unwrap();

        let err = manager
            .update_profile(
                &mut b,
                AccountChanges {
                    email: Some("a@x.com".into()),
                    ..AccountChanges::default()
                },
            )
            .await
            .unwrap_err();
        assert!(field_errors(err).get("email").is_some());

        let stored = store.get(b.id).await.unwrap().unwrap();
        assert_eq!(stored.email, "b@x.com");
    }

    #[tokio::test]
    async fn update_profile_blank_name_rejected() {
        let (manager, _) = setup();
        let mut account = manager
            .create_account("a@x.com", "A", Some("pw"))
            .await
            .unwrap();
        let err = manager
            .update_profile(
                &mut account,
                AccountChanges {
                    name: Some("   ".into()),
                    ..AccountChanges::default()
                },
            )
            .await
            .unwrap_err();
        assert!(field_errors(err).get("name").is_some());
        assert_eq!(account.name, "A");
    }

    #[tokio::test]
    async fn blank_password_rejected_on_every_write() {
        let (manager, store) = setup();
        let err = manager.create_account("e@x.com", "E", Some("")).await.unwrap_err();
        assert_eq!(
            field_errors(err).get("password").unwrap(),
            ["This field may not be blank.".to_string()]
        );
        let err = manager
            .create_privileged_account("root@x.com", "Root", "  ")
            .await
            .unwrap_err();
        assert!(field_errors(err).get("password").is_some());
        assert!(store.list(None).await.unwrap().is_empty());

        let mut account = manager
            .create_account("e@x.com", "E", Some("secret123"))
            .await
            .unwrap();
        let err = manager
            .update_profile(
                &mut account,
                AccountChanges {
                    name: Some("Renamed".into()),
                    password: Some(String::new()),
                    ..AccountChanges::default()
                },
            )
            .await
            .unwrap_err();
        assert!(field_errors(err).get("password").is_some());
        assert_eq!(account.name, "E");

        let err = manager.update_password(&mut account, "").await.unwrap_err();
        assert!(field_errors(err).get("password").is_some());

        let stored = store.get(account.id).await.unwrap().unwrap();
        assert!(manager.hasher().verify("secret123", &stored.password_hash));
        assert!(matches!(
            manager.authenticate("e@x.com", "").await,
            Err(AccountError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn unknown_email_fails_like_wrong_password() {
        let (manager, _) = setup();
        manager
            .create_account("a@x.com", "A", Some("secret123"))
            .await
            .unwrap();

        let unknown = manager.authenticate("ghost@x.com", "secret123").await.unwrap_err();
        let wrong = manager.authenticate("a@x.com", "secret124").await.unwrap_err();
        assert_eq!(unknown.to_string(), wrong.to_string());
        assert!(matches!(unknown, AccountError::InvalidCredentials));
    }

    #[tokio::test]
    async fn only_superusers_change_flags() {
        let (manager, _) = setup();
        let mut target = manager
            .create_account("a@x.com", "A", Some("pw"))
            .await
            .unwrap();
        let staff_only = Principal {
            account_id: AccountId::new(50),
            is_staff: true,
            is_superuser: false,
        };

        let err = manager
            .set_flags(
                &staff_only,
                &mut target,
                FlagChanges {
                    is_staff: Some(true),
                    ..FlagChanges::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::Domain(DomainError::Forbidden(_))));
        assert!(!target.is_staff);
    }

    #[tokio::test]
    async fn search_and_delete() {
        let (manager, _) = setup();
        let alice = manager
            .create_account("alice@x.com", "Alice", Some("pw"))
            .await
            .unwrap();
        manager
            .create_account("bob@x.com", "Bob", Some("pw"))
            .await
            .unwrap();

        assert_eq!(manager.list(Some("ALICE")).await.unwrap().len(), 1);
        assert_eq!(manager.list(Some("  ")).await.unwrap().len(), 2);

        manager.delete_account(alice.id).await.unwrap();
        assert!(matches!(
            manager.get(alice.id).await,
            Err(AccountError::Domain(DomainError::NotFound))
        ));
        assert!(matches!(
            manager.delete_account(alice.id).await,
            Err(AccountError::Domain(DomainError::NotFound))
        ));
    }

    #[tokio::test]
    async fn login_token_is_stable_per_account() {
        let (manager, _) = setup();
        let tokens = InMemoryTokenStore::new();
        let account = manager
            .create_account("a@x.com", "A", Some("pw"))
            .await
            .unwrap();

        let first = tokens.get_or_create(account.id).await.unwrap();
        let second = tokens.get_or_create(account.id).await.unwrap();
        assert_eq!(first.key, second.key);
        assert_eq!(
            tokens.resolve(first.key.as_str()).await.unwrap(),
            Some(account.id)
        );
    }
}
