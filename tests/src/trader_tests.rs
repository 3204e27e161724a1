//! Trader adapter tests against scripted venue clients

use bitbot_core::{Fixed, fixed};
use bitbot_exchanges::*;
use bitbot_tests::MockExchangeClient;
use serde_json::json;
use std::time::Duration;

fn btc() -> Currency {
    Currency::from("BTC")
}

fn settlement() -> SettlementConfig {
    SettlementConfig::default()
        .with_poll_interval(Duration::from_millis(1))
        .with_threshold("BTC", fixed!(1))
}

fn rejected(venue: &str, message: &str) -> ExchangeError {
    ExchangeError::Rejected {
        venue: venue.to_string(),
        message: message.to_string(),
    }
}

// ============================================================================
// HITBTC
// ============================================================================

mod hitbtc_tests {
    use super::*;

    fn trader(client: MockExchangeClient) -> HitbtcTrader<MockExchangeClient> {
        HitbtcTrader::new(client, settlement())
    }

    #[monoio::test(timer_enabled = true)]
    async fn test_withdraw_moves_funds_to_main_account_first() {
        let trader = trader(MockExchangeClient::new("hitbtc"));

        let id = trader.withdraw(fixed!(0.5), &btc(), "1BoatSLRHtKNngkdXEeobR76b53LETtpyT").await.unwrap();

        assert_eq!(id, "withdrawal-BTC");
        assert_eq!(trader.client().operations(), ["transfer_to_main", "withdraw"]);
        assert_eq!(
            trader.client().calls()[1].1,
            "0.5 BTC 1BoatSLRHtKNngkdXEeobR76b53LETtpyT"
        );
    }

    #[monoio::test(timer_enabled = true)]
    async fn test_failed_internal_transfer_skips_withdrawal() {
        let client = MockExchangeClient::new("hitbtc")
            .failing("transfer_to_main", rejected("hitbtc", "Insufficient funds"));
        let trader = trader(client);

        let err = trader.withdraw(fixed!(2), &btc(), "addr").await.unwrap_err();

        assert_eq!(err.transfer_leg(), Some(TransferLeg::TradingToMain));
        assert!(matches!(
            &err,
            ExchangeError::Operation { venue, operation: "withdraw", .. } if venue == "hitbtc"
        ));
        assert!(matches!(err.root_cause(), ExchangeError::Rejected { .. }));
        assert_eq!(trader.client().call_count("withdraw"), 0);
    }

    #[monoio::test(timer_enabled = true)]
    async fn test_failed_withdrawal_names_its_leg() {
        let client = MockExchangeClient::new("hitbtc")
            .failing("withdraw", ExchangeError::NetworkError("connection reset".to_string()));
        let trader = trader(client);

        let err = trader.withdraw(fixed!(1), &btc(), "addr").await.unwrap_err();

        assert_eq!(err.transfer_leg(), Some(TransferLeg::Withdrawal));
        assert_eq!(trader.client().operations(), ["transfer_to_main", "withdraw"]);
    }

    #[monoio::test(timer_enabled = true)]
    async fn test_wait_balance_polls_until_threshold_then_moves_to_trading() {
        let client = MockExchangeClient::new("hitbtc").with_main_balances("BTC", &["0.1", "0.5", "1.2"]);
        let trader = trader(client);

        trader.wait_balance(&btc()).await.unwrap();

        assert_eq!(trader.client().call_count("main_balances"), 3);
        let calls = trader.client().calls();
        let last = calls.last().unwrap();
        assert_eq!((last.0.as_str(), last.1.as_str()), ("transfer_to_trading", "1.2 BTC"));
    }

    #[monoio::test(timer_enabled = true)]
    async fn test_wait_balance_transfer_failure_names_its_leg() {
        let client = MockExchangeClient::new("hitbtc")
            .with_main_balances("BTC", &["3"])
            .failing("transfer_to_trading", rejected("hitbtc", "Account is blocked"));
        let trader = trader(client);

        let err = trader.wait_balance(&btc()).await.unwrap_err();

        assert_eq!(err.transfer_leg(), Some(TransferLeg::MainToTrading));
        assert_eq!(trader.client().call_count("main_balances"), 1);
    }

    #[monoio::test(timer_enabled = true)]
    async fn test_wait_balance_gives_up_after_max_wait() {
        let client = MockExchangeClient::new("hitbtc").with_main_balances("BTC", &["0"]);
        let trader = HitbtcTrader::new(
            client,
            settlement().with_max_wait(Some(Duration::from_millis(10))),
        );

        let err = trader.wait_balance(&btc()).await.unwrap_err();

        assert!(matches!(err.root_cause(), ExchangeError::SettlementTimeout { .. }));
        assert_eq!(trader.client().call_count("transfer_to_trading"), 0);
    }

    #[monoio::test(timer_enabled = true)]
    async fn test_wait_balance_requires_a_threshold() {
        let trader = trader(MockExchangeClient::new("hitbtc").with_main_balances("ETH", &["10"]));

        let err = trader.wait_balance(&Currency::from("ETH")).await.unwrap_err();

        assert!(matches!(err.root_cause(), ExchangeError::ConfigurationError(_)));
        assert_eq!(trader.client().call_count("main_balances"), 0);
    }

    #[monoio::test(timer_enabled = true)]
    async fn test_payment_address_is_cached_per_currency() {
        let client = MockExchangeClient::new("hitbtc").with_deposit_addresses(&[("BTC", "btc-addr"), ("ETH", "eth-addr")]);
        let trader = trader(client);

        assert_eq!(trader.payment_address(&btc()).await.unwrap(), "btc-addr");
        assert_eq!(trader.payment_address(&btc()).await.unwrap(), "btc-addr");
        assert_eq!(trader.payment_address(&Currency::from("ETH")).await.unwrap(), "eth-addr");

        assert_eq!(trader.client().call_count("deposit_address"), 2);
    }

    #[monoio::test(timer_enabled = true)]
    async fn test_trading_balances_are_narrowed_to_request() {
        let client = MockExchangeClient::new("hitbtc").with_trading_listing(&[("BTC", "1"), ("ETH", "0"), ("USD", "250")]);
        let trader = trader(client);

        let balances = trader.trading_balances(&[btc(), Currency::from("ETH")]).await.unwrap();

        assert_eq!(balances.len(), 2);
        assert_eq!(balances[&btc()], fixed!(1));
        assert_eq!(balances[&Currency::from("ETH")], Fixed::ZERO);
    }

    #[monoio::test(timer_enabled = true)]
    async fn test_trading_balances_reject_unlisted_currency() {
        let trader = trader(MockExchangeClient::new("hitbtc").with_trading_listing(&[("BTC", "1")]));

        let err = trader.trading_balances(&[btc(), Currency::from("NOTACOIN")]).await.unwrap_err();

        assert!(matches!(
            &err,
            ExchangeError::Operation { operation: "trading_balances", .. }
        ));
        assert!(matches!(err.root_cause(), ExchangeError::UnsupportedCurrency(c) if c.as_str() == "NOTACOIN"));
    }

    #[monoio::test(timer_enabled = true)]
    async fn test_market_order_is_forwarded() {
        let trader = trader(MockExchangeClient::new("hitbtc"));

        let confirmation = trader
            .place_order(OrderSide::Buy, &Pair::new("BTC", "USD"), fixed!(10000), fixed!(0.01))
            .await
            .unwrap();

        assert_eq!(confirmation.order_id, "mock-1");
        let orders = trader.client().orders();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].order_type, OrderType::Market);
        assert_eq!(orders[0].volume, fixed!(0.01));
    }
}

// ============================================================================
// POLONIEX
// ============================================================================

mod poloniex_tests {
    use super::*;

    fn trader(client: MockExchangeClient) -> PoloniexTrader<MockExchangeClient> {
        PoloniexTrader::new(client, settlement())
    }

    #[monoio::test(timer_enabled = true)]
    async fn test_one_listing_serves_every_currency() {
        let client =
            MockExchangeClient::new("poloniex").with_deposit_addresses(&[("BTC", "btc-addr"), ("USD", "usdt-addr")]);
        let trader = trader(client);

        assert_eq!(trader.payment_address(&btc()).await.unwrap(), "btc-addr");
        assert_eq!(trader.payment_address(&Currency::from("USD")).await.unwrap(), "usdt-addr");
        assert_eq!(trader.payment_address(&btc()).await.unwrap(), "btc-addr");

        assert_eq!(trader.client().call_count("deposit_addresses"), 1);
    }

    #[monoio::test(timer_enabled = true)]
    async fn test_missing_address_is_reported() {
        let trader = trader(MockExchangeClient::new("poloniex").with_deposit_addresses(&[("BTC", "btc-addr")]));

        let err = trader.payment_address(&Currency::from("XMR")).await.unwrap_err();

        assert!(matches!(err.root_cause(), ExchangeError::MissingAddress(c) if c.as_str() == "XMR"));
        assert_eq!(trader.client().call_count("deposit_addresses"), 1);
    }

    #[monoio::test(timer_enabled = true)]
    async fn test_failed_listing_is_retried() {
        let client = MockExchangeClient::new("poloniex")
            .failing("deposit_addresses", ExchangeError::NetworkError("timeout".to_string()));
        let trader = trader(client);

        assert!(trader.payment_address(&btc()).await.is_err());
        assert!(trader.payment_address(&btc()).await.is_err());
        assert_eq!(trader.client().call_count("deposit_addresses"), 2);
    }

    #[monoio::test(timer_enabled = true)]
    async fn test_wait_balance_watches_trading_account() {
        let client = MockExchangeClient::new("poloniex").with_trading_balances("BTC", &["0", "0.99", "1"]);
        let trader = trader(client);

        trader.wait_balance(&btc()).await.unwrap();

        assert_eq!(trader.client().call_count("trading_balances"), 3);
        assert_eq!(trader.client().call_count("main_balances"), 0);
        assert_eq!(trader.client().call_count("transfer_to_trading"), 0);
    }

    #[monoio::test(timer_enabled = true)]
    async fn test_poll_error_stops_the_wait() {
        let client = MockExchangeClient::new("poloniex")
            .with_trading_balance_error(rejected("poloniex", "Invalid API key/secret pair."));
        let trader = trader(client);

        let err = trader.wait_balance(&btc()).await.unwrap_err();

        assert!(matches!(err.root_cause(), ExchangeError::Rejected { .. }));
        assert_eq!(trader.client().call_count("trading_balances"), 1);
    }

    #[monoio::test(timer_enabled = true)]
    async fn test_withdraw_is_a_single_call() {
        let trader = trader(MockExchangeClient::new("poloniex"));

        trader.withdraw(fixed!(0.3), &btc(), "addr").await.unwrap();

        assert_eq!(trader.client().operations(), ["withdraw"]);
    }

    #[monoio::test(timer_enabled = true)]
    async fn test_trading_balances_reject_unlisted_currency() {
        let client = MockExchangeClient::new("poloniex").with_trading_listing(&[("BTC", "0.59"), ("USD", "120.5")]);
        let trader = trader(client);

        let balances = trader.trading_balances(&[Currency::from("USD")]).await.unwrap();
        assert_eq!(balances, BalanceMap::from([(Currency::from("USD"), fixed!(120.5))]));

        let err = trader.trading_balances(&[Currency::from("NOTACOIN")]).await.unwrap_err();
        assert!(matches!(err.root_cause(), ExchangeError::UnsupportedCurrency(c) if c.as_str() == "NOTACOIN"));
    }

    #[monoio::test(timer_enabled = true)]
    async fn test_limit_order_is_forwarded() {
        let trader = trader(MockExchangeClient::new("poloniex"));

        trader
            .place_order(OrderSide::Sell, &Pair::new("BTC", "USD"), fixed!(10100), fixed!(0.2))
            .await
            .unwrap();

        let orders = trader.client().orders();
        assert_eq!(orders[0].order_type, OrderType::Limit);
        assert_eq!(orders[0].side, OrderSide::Sell);
    }
}

// ============================================================================
// KRAKEN
// ============================================================================

mod kraken_tests {
    use super::*;

    fn trader(client: MockExchangeClient) -> KrakenTrader<MockExchangeClient> {
        KrakenTrader::new(client, settlement())
    }

    #[monoio::test(timer_enabled = true)]
    async fn test_payment_address_resolves_method_then_address() {
        let client = MockExchangeClient::new("kraken")
            .with_query("DepositMethods", Ok(json!([{"method": "Bitcoin", "limit": false, "fee": "0.0000000000"}])))
            .with_query("DepositAddresses", Ok(json!([{"address": "bc1qkraken", "expiretm": "0"}])));
        let trader = trader(client);

        assert_eq!(trader.payment_address(&btc()).await.unwrap(), "bc1qkraken");
        assert_eq!(trader.payment_address(&btc()).await.unwrap(), "bc1qkraken");

        let calls = trader.client().calls();
        assert_eq!(calls.len(), 2);
        assert_eq!((calls[0].0.as_str(), calls[0].1.as_str()), ("query:DepositMethods", "asset=XXBT"));
        assert_eq!(
            (calls[1].0.as_str(), calls[1].1.as_str()),
            ("query:DepositAddresses", "asset=XXBT&method=Bitcoin")
        );
    }

    #[monoio::test(timer_enabled = true)]
    async fn test_empty_address_list_is_missing_address() {
        let client = MockExchangeClient::new("kraken")
            .with_query("DepositMethods", Ok(json!([{"method": "Bitcoin"}])))
            .with_query("DepositAddresses", Ok(json!([])));
        let trader = trader(client);

        let err = trader.payment_address(&btc()).await.unwrap_err();

        assert!(matches!(err.root_cause(), ExchangeError::MissingAddress(_)));
    }

    #[monoio::test(timer_enabled = true)]
    async fn test_withdraw_uses_asset_code_and_returns_refid() {
        let client =
            MockExchangeClient::new("kraken").with_query("Withdraw", Ok(json!({"refid": "AGBSO6T-UFMTTQ-I7KGS6"})));
        let trader = trader(client);

        let refid = trader.withdraw(fixed!(0.725), &btc(), "cold wallet").await.unwrap();

        assert_eq!(refid, "AGBSO6T-UFMTTQ-I7KGS6");
        assert_eq!(
            trader.client().calls()[0].1,
            "asset=XXBT&key=cold wallet&amount=0.725"
        );
    }

    #[monoio::test(timer_enabled = true)]
    async fn test_rejected_withdrawal_names_its_leg() {
        let client = MockExchangeClient::new("kraken")
            .with_query("Withdraw", Err(rejected("kraken", "EFunding:Unknown withdraw key")));
        let trader = trader(client);

        let err = trader.withdraw(fixed!(1), &btc(), "nobody").await.unwrap_err();

        assert_eq!(err.transfer_leg(), Some(TransferLeg::Withdrawal));
        assert!(matches!(err.root_cause(), ExchangeError::Rejected { message, .. } if message.contains("withdraw key")));
    }

    #[monoio::test(timer_enabled = true)]
    async fn test_unsupported_currency_makes_no_call() {
        let trader = trader(MockExchangeClient::new("kraken"));

        let err = trader.withdraw(fixed!(1), &Currency::from("DOGE"), "key").await.unwrap_err();
        assert!(matches!(err.root_cause(), ExchangeError::UnsupportedCurrency(_)));

        let err = trader.trading_balances(&[Currency::from("DOGE")]).await.unwrap_err();
        assert!(matches!(err.root_cause(), ExchangeError::UnsupportedCurrency(_)));

        assert!(trader.client().calls().is_empty());
    }

    #[monoio::test(timer_enabled = true)]
    async fn test_trading_balances_default_to_zero() {
        let client = MockExchangeClient::new("kraken").with_query("Balance", Ok(json!({"XXBT": "0.5", "XETH": "3"})));
        let trader = trader(client);

        let balances = trader.trading_balances(&[btc(), Currency::from("USD")]).await.unwrap();

        assert_eq!(balances.len(), 2);
        assert_eq!(balances[&btc()], fixed!(0.5));
        assert_eq!(balances[&Currency::from("USD")], Fixed::ZERO);
        assert_eq!(trader.client().call_count("query:Balance"), 1);
    }

    #[monoio::test(timer_enabled = true)]
    async fn test_wait_balance_polls_balance_query() {
        let client = MockExchangeClient::new("kraken")
            .with_query("Balance", Ok(json!({})))
            .with_query("Balance", Ok(json!({"XXBT": "1.0001"})));
        let trader = trader(client);

        trader.wait_balance(&btc()).await.unwrap();

        assert_eq!(trader.client().call_count("query:Balance"), 2);
    }
}

// ============================================================================
// ORDER VALIDATION (every venue)
// ============================================================================

fn traders() -> Vec<Box<dyn Trader>> {
    vec![
        Box::new(HitbtcTrader::new(MockExchangeClient::new("hitbtc"), settlement())),
        Box::new(PoloniexTrader::new(MockExchangeClient::new("poloniex"), settlement())),
        Box::new(KrakenTrader::new(MockExchangeClient::new("kraken"), settlement())),
    ]
}

#[monoio::test(timer_enabled = true)]
async fn test_non_positive_orders_are_rejected() {
    let cases = [("0", "1"), ("-100", "1"), ("100", "0"), ("100", "-0.5")];

    for (price, volume) in cases {
        let price = Fixed::from_str_exact(price).unwrap();
        let volume = Fixed::from_str_exact(volume).unwrap();

        for trader in traders() {
            let err = trader
                .place_order(OrderSide::Buy, &Pair::new("BTC", "USD"), price, volume)
                .await
                .unwrap_err();

            assert!(matches!(
                &err,
                ExchangeError::Operation { operation: "place_order", venue, .. } if venue == trader.exchanger()
            ));
            assert!(matches!(err.root_cause(), ExchangeError::InvalidOrder(_)));
        }
    }
}

#[monoio::test(timer_enabled = true)]
async fn test_rejected_order_never_reaches_the_venue() {
    let trader = KrakenTrader::new(MockExchangeClient::new("kraken"), settlement());

    assert!(trader.place_order(OrderSide::Sell, &Pair::new("BTC", "EUR"), fixed!(0), fixed!(1)).await.is_err());
    assert!(trader.client().calls().is_empty());
}

#[monoio::test(timer_enabled = true)]
async fn test_errors_carry_venue_and_operation() {
    let client = MockExchangeClient::new("poloniex").with_trading_balance_error(ExchangeError::HttpError(
        502,
        "Bad Gateway".to_string(),
    ));
    let trader = PoloniexTrader::new(client, settlement());

    let err = trader.trading_balances(&[btc()]).await.unwrap_err();

    assert_eq!(err.to_string(), "poloniex: trading_balances failed: HTTP error 502: Bad Gateway");
}
