#[cfg(test)]
mod tests {
    use crate::logic::{
        exchange_token_logic, link_device_logic, register_device_logic, ExchangeTokenRequest,
        LinkDeviceRequest, PairingError,
    };
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use slidelink_common::models::UserIdentity;
    use slidelink_common::services::{BoxFuture, Clock};
    use slidelink_config::PairingConfig;
    use slidelink_db::{
        DbError, MemoryPairingAttemptRepository, PairingAttempt, PairingAttemptRepository,
    };
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};

    /// A clock the tests can move by hand.
    struct ManualClock {
        now: Mutex<DateTime<Utc>>,
    }

    impl ManualClock {
        fn starting_at(now: DateTime<Utc>) -> Self {
            Self { now: Mutex::new(now) }
        }

        fn advance(&self, by: Duration) {
            let mut now = self.now.lock().unwrap();
            *now += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.now.lock().unwrap()
        }
    }

    fn test_start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()
    }

    fn test_config() -> PairingConfig {
        PairingConfig::default()
    }

    fn user(id: &str) -> UserIdentity {
        UserIdentity {
            user_id: id.to_string(),
            user_email: format!("{}@example.com", id),
        }
    }

    fn link_request(code: &str) -> LinkDeviceRequest {
        LinkDeviceRequest { code: code.to_string() }
    }

    fn exchange_request(device_id: &str, code: &str) -> ExchangeTokenRequest {
        ExchangeTokenRequest {
            device_id: device_id.to_string(),
            code: code.to_string(),
        }
    }

    #[tokio::test]
    async fn test_round_trip_register_link_exchange() {
        let repo = MemoryPairingAttemptRepository::new();
        let clock = ManualClock::starting_at(test_start());
        let config = test_config();

        let registered = register_device_logic(&repo, &config, &clock).await.unwrap();
        assert_eq!(registered.code.len(), config.code_length);
        assert_eq!(
            registered.expires_at,
            test_start() + Duration::minutes(config.code_ttl_minutes)
        );

        // Polling before the user has linked must not mint a token
        let early = exchange_token_logic(
            &repo,
            &config,
            exchange_request(&registered.device_id, &registered.code),
            &clock,
        )
        .await;
        assert!(matches!(early, Err(PairingError::NotLinked)));

        let linked = link_device_logic(&repo, user("u1"), link_request(&registered.code), &clock)
            .await
            .unwrap();
        assert!(linked.success);
        assert_eq!(linked.device_id, registered.device_id);

        let exchanged = exchange_token_logic(
            &repo,
            &config,
            exchange_request(&registered.device_id, &registered.code),
            &clock,
        )
        .await
        .unwrap();
        assert!(exchanged.token.starts_with("slt_"));
        assert_eq!(
            exchanged.expires_at,
            test_start() + Duration::hours(config.token_ttl_hours)
        );

        // Single-use: the second exchange finds nothing
        let replay = exchange_token_logic(
            &repo,
            &config,
            exchange_request(&registered.device_id, &registered.code),
            &clock,
        )
        .await;
        assert!(matches!(replay, Err(PairingError::NotFound)));
    }

    #[tokio::test]
    async fn test_exchange_on_unlinked_attempt_stays_not_linked() {
        let repo = MemoryPairingAttemptRepository::new();
        let clock = ManualClock::starting_at(test_start());
        let config = test_config();

        let registered = register_device_logic(&repo, &config, &clock).await.unwrap();
        for _ in 0..5 {
            let result = exchange_token_logic(
                &repo,
                &config,
                exchange_request(&registered.device_id, &registered.code),
                &clock,
            )
            .await;
            assert!(matches!(result, Err(PairingError::NotLinked)));
        }
        // The repeated polls consumed nothing
        assert!(repo.find_by_code(&registered.code).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_expiry_supersedes_linking() {
        let repo = MemoryPairingAttemptRepository::new();
        let clock = ManualClock::starting_at(test_start());
        let config = test_config();

        let registered = register_device_logic(&repo, &config, &clock).await.unwrap();
        link_device_logic(&repo, user("u1"), link_request(&registered.code), &clock)
            .await
            .unwrap();

        clock.advance(Duration::minutes(config.code_ttl_minutes) + Duration::seconds(1));

        // Even a linked attempt is treated as absent once expired
        let exchange = exchange_token_logic(
            &repo,
            &config,
            exchange_request(&registered.device_id, &registered.code),
            &clock,
        )
        .await;
        assert!(matches!(exchange, Err(PairingError::Expired)));

        // The lazy cleanup removed the record
        assert!(repo.find_by_code(&registered.code).await.unwrap().is_none());

        let relink =
            link_device_logic(&repo, user("u1"), link_request(&registered.code), &clock).await;
        assert!(matches!(relink, Err(PairingError::NotFound)));
    }

    #[tokio::test]
    async fn test_link_on_expired_code_cleans_up_lazily() {
        let repo = MemoryPairingAttemptRepository::new();
        let clock = ManualClock::starting_at(test_start());
        let config = test_config();

        let registered = register_device_logic(&repo, &config, &clock).await.unwrap();
        clock.advance(Duration::minutes(config.code_ttl_minutes));

        let result =
            link_device_logic(&repo, user("u1"), link_request(&registered.code), &clock).await;
        assert!(matches!(result, Err(PairingError::Expired)));
        assert!(repo.find_by_code(&registered.code).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_exchange_with_wrong_device_is_rejected_without_consuming() {
        let repo = MemoryPairingAttemptRepository::new();
        let clock = ManualClock::starting_at(test_start());
        let config = test_config();

        let registered = register_device_logic(&repo, &config, &clock).await.unwrap();
        link_device_logic(&repo, user("u1"), link_request(&registered.code), &clock)
            .await
            .unwrap();

        let result = exchange_token_logic(
            &repo,
            &config,
            exchange_request("not-the-device", &registered.code),
            &clock,
        )
        .await;
        assert!(matches!(result, Err(PairingError::InvalidDevice)));

        // The failed attempt did not consume the record; the right device
        // can still complete the exchange
        let exchanged = exchange_token_logic(
            &repo,
            &config,
            exchange_request(&registered.device_id, &registered.code),
            &clock,
        )
        .await;
        assert!(exchanged.is_ok());
    }

    #[tokio::test]
    async fn test_relink_same_user_reconfirms_other_user_rejected() {
        let repo = MemoryPairingAttemptRepository::new();
        let clock = ManualClock::starting_at(test_start());
        let config = test_config();

        let registered = register_device_logic(&repo, &config, &clock).await.unwrap();
        let first = link_device_logic(&repo, user("u1"), link_request(&registered.code), &clock)
            .await
            .unwrap();

        // Double-submitting the form is harmless for the same account
        let again = link_device_logic(&repo, user("u1"), link_request(&registered.code), &clock)
            .await
            .unwrap();
        assert_eq!(again.device_id, first.device_id);

        // Another account cannot take over the code
        let stolen =
            link_device_logic(&repo, user("u2"), link_request(&registered.code), &clock).await;
        assert!(matches!(stolen, Err(PairingError::AlreadyLinked)));
    }

    #[tokio::test]
    async fn test_validation_of_missing_fields() {
        let repo = MemoryPairingAttemptRepository::new();
        let clock = ManualClock::starting_at(test_start());
        let config = test_config();

        let link = link_device_logic(&repo, user("u1"), link_request("   "), &clock).await;
        assert!(matches!(link, Err(PairingError::ValidationError(_))));

        let exchange =
            exchange_token_logic(&repo, &config, exchange_request("", "XK4M2P"), &clock).await;
        assert!(matches!(exchange, Err(PairingError::ValidationError(_))));

        let exchange =
            exchange_token_logic(&repo, &config, exchange_request("d1", ""), &clock).await;
        assert!(matches!(exchange, Err(PairingError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_link_accepts_lowercase_input() {
        let repo = MemoryPairingAttemptRepository::new();
        let clock = ManualClock::starting_at(test_start());
        let config = test_config();

        let registered = register_device_logic(&repo, &config, &clock).await.unwrap();
        let typed = registered.code.to_ascii_lowercase();
        let linked = link_device_logic(&repo, user("u1"), link_request(&typed), &clock).await;
        assert!(linked.is_ok());
    }

    #[tokio::test]
    async fn test_unknown_code_is_not_found() {
        let repo = MemoryPairingAttemptRepository::new();
        let clock = ManualClock::starting_at(test_start());
        let config = test_config();

        let link = link_device_logic(&repo, user("u1"), link_request("ZZZZZZ"), &clock).await;
        assert!(matches!(link, Err(PairingError::NotFound)));

        let exchange =
            exchange_token_logic(&repo, &config, exchange_request("d1", "ZZZZZZ"), &clock).await;
        assert!(matches!(exchange, Err(PairingError::NotFound)));
    }

    #[tokio::test]
    async fn test_registration_produces_distinct_codes_and_devices() {
        let repo = MemoryPairingAttemptRepository::new();
        let clock = ManualClock::starting_at(test_start());
        let config = test_config();

        let mut codes = HashSet::new();
        let mut devices = HashSet::new();
        for _ in 0..1000 {
            let registered = register_device_logic(&repo, &config, &clock).await.unwrap();
            codes.insert(registered.code);
            devices.insert(registered.device_id);
        }
        assert_eq!(codes.len(), 1000);
        assert_eq!(devices.len(), 1000);
    }

    #[tokio::test]
    async fn test_concurrent_exchange_issues_exactly_one_token() {
        let repo = Arc::new(MemoryPairingAttemptRepository::new());
        let clock = Arc::new(ManualClock::starting_at(test_start()));
        let config = Arc::new(test_config());

        let registered = register_device_logic(repo.as_ref(), &config, clock.as_ref())
            .await
            .unwrap();
        link_device_logic(
            repo.as_ref(),
            user("u1"),
            link_request(&registered.code),
            clock.as_ref(),
        )
        .await
        .unwrap();

        let mut handles = Vec::new();
        for _ in 0..16 {
            let repo = Arc::clone(&repo);
            let clock = Arc::clone(&clock);
            let config = Arc::clone(&config);
            let device_id = registered.device_id.clone();
            let code = registered.code.clone();
            handles.push(tokio::spawn(async move {
                exchange_token_logic(
                    repo.as_ref(),
                    &config,
                    ExchangeTokenRequest { device_id, code },
                    clock.as_ref(),
                )
                .await
            }));
        }

        let mut tokens = 0;
        let mut not_found = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(response) => {
                    assert!(response.token.starts_with("slt_"));
                    tokens += 1;
                }
                Err(PairingError::NotFound) => not_found += 1,
                Err(other) => panic!("unexpected outcome: {:?}", other),
            }
        }
        assert_eq!(tokens, 1, "exactly one caller may win the exchange");
        assert_eq!(not_found, 15);
    }

    /// A store whose inserts always collide, to exercise the retry cap.
    struct SaturatedStore;

    impl PairingAttemptRepository for SaturatedStore {
        fn init_schema(&self) -> BoxFuture<'_, (), DbError> {
            Box::pin(async { Ok(()) })
        }

        fn insert<'a>(
            &'a self,
            _attempt: PairingAttempt,
            _now: DateTime<Utc>,
        ) -> BoxFuture<'a, bool, DbError> {
            Box::pin(async { Ok(false) })
        }

        fn find_by_code<'a>(
            &'a self,
            _code: &'a str,
        ) -> BoxFuture<'a, Option<PairingAttempt>, DbError> {
            Box::pin(async { Ok(None) })
        }

        fn claim_link<'a>(
            &'a self,
            _code: &'a str,
            _user: slidelink_common::models::LinkedUser,
            _now: DateTime<Utc>,
        ) -> BoxFuture<'a, Option<PairingAttempt>, DbError> {
            Box::pin(async { Ok(None) })
        }

        fn claim_exchange<'a>(
            &'a self,
            _code: &'a str,
            _device_id: &'a str,
            _now: DateTime<Utc>,
        ) -> BoxFuture<'a, Option<PairingAttempt>, DbError> {
            Box::pin(async { Ok(None) })
        }

        fn remove_expired<'a>(
            &'a self,
            _code: &'a str,
            _now: DateTime<Utc>,
        ) -> BoxFuture<'a, bool, DbError> {
            Box::pin(async { Ok(false) })
        }

        fn purge_expired(&self, _now: DateTime<Utc>) -> BoxFuture<'_, u64, DbError> {
            Box::pin(async { Ok(0) })
        }
    }

    #[tokio::test]
    async fn test_registration_gives_up_after_bounded_retries() {
        let clock = ManualClock::starting_at(test_start());
        let config = test_config();

        let result = register_device_logic(&SaturatedStore, &config, &clock).await;
        assert!(matches!(result, Err(PairingError::RegistrationFailed(_))));
    }
}
