//! The straddle ladder state machine.
//!
//! Owns the tracked ladder and executes its three transitions: initiate,
//! roll up, roll down. Every transition is confirmation-gated before the
//! first order, places its legs strictly sequentially with pacing, and
//! applies the best-effort policy: an individual leg failure is recorded
//! and reported but neither rolls back earlier legs nor stops later ones,
//! and the ladder still advances to the intended strikes. The
//! reconciliation gate (see `reconcile`) is what keeps a ladder that does
//! not reflect reality from rolling further.

use crate::error::{EngineError, Result};
use crate::pacing::Pacer;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::sync::Arc;
use straddle_core::{
    parse_spot_price, ConfirmationGate, Ladder, OptionLeg, Strike, StrategyConfig,
    TransactionSide,
};
use straddle_dhan::{
    nearest_weekly_expiry, weekday_from_index, CatalogCache, DhanClient, DhanError,
    InstrumentCatalog, OrderReceipt, OrderRequest,
};
use tracing::{info, warn};

// =============================================================================
// Transition reporting
// =============================================================================

/// What happened to one leg of a transition.
#[derive(Debug)]
pub enum LegDetail {
    /// Order submitted; receipt from the brokerage.
    Placed(OrderReceipt),
    /// The leg was not placed (resolution failure, rejection, transport).
    Failed(DhanError),
}

/// Per-leg record within a transition report.
#[derive(Debug)]
pub struct LegOutcome {
    /// The contract leg.
    pub leg: OptionLeg,
    /// BUY (closing) or SELL (opening).
    pub side: TransactionSide,
    /// Placement result.
    pub detail: LegDetail,
}

impl LegOutcome {
    /// True when the order was submitted successfully.
    #[must_use]
    pub fn is_placed(&self) -> bool {
        matches!(self.detail, LegDetail::Placed(_))
    }
}

/// Result of an executed transition.
#[derive(Debug)]
pub struct TransitionReport {
    /// The ladder after the transition.
    pub ladder: Ladder,
    /// Per-leg outcomes in submission order.
    pub legs: Vec<LegOutcome>,
}

impl TransitionReport {
    /// True when every leg was submitted.
    #[must_use]
    pub fn all_placed(&self) -> bool {
        self.legs.iter().all(LegOutcome::is_placed)
    }

    /// The legs that failed, in submission order.
    pub fn failures(&self) -> impl Iterator<Item = &LegOutcome> {
        self.legs.iter().filter(|l| !l.is_placed())
    }
}

/// Outcome of a requested transition.
#[derive(Debug)]
pub enum TransitionOutcome {
    /// The operator declined the confirmation prompt; nothing was placed.
    Declined,
    /// Orders were submitted (possibly with per-leg failures).
    Executed(TransitionReport),
}

// =============================================================================
// StraddleRoller
// =============================================================================

/// The state machine owning the tracked ladder.
///
/// EMPTY (no strikes) or ACTIVE (exactly three). Initiate is allowed from
/// either state and overwrites; rolls require ACTIVE.
pub struct StraddleRoller<G, P> {
    client: Arc<DhanClient>,
    catalog: Arc<CatalogCache>,
    strategy: StrategyConfig,
    gate: G,
    pacer: P,
    ladder: Ladder,
}

impl<G: ConfirmationGate, P: Pacer> StraddleRoller<G, P> {
    /// Creates a roller with an empty ladder.
    pub fn new(
        client: Arc<DhanClient>,
        catalog: Arc<CatalogCache>,
        strategy: StrategyConfig,
        gate: G,
        pacer: P,
    ) -> Self {
        Self {
            client,
            catalog,
            strategy,
            gate,
            pacer,
            ladder: Ladder::empty(),
        }
    }

    /// Seeds the ladder, e.g. one re-derived from live positions.
    #[must_use]
    pub fn with_ladder(mut self, ladder: Ladder) -> Self {
        self.ladder = ladder;
        self
    }

    /// The currently tracked ladder.
    #[must_use]
    pub fn ladder(&self) -> &Ladder {
        &self.ladder
    }

    /// The expiry any new order resolves against.
    #[must_use]
    pub fn current_expiry(&self) -> NaiveDate {
        nearest_weekly_expiry(
            chrono::Local::now().naive_local(),
            weekday_from_index(self.strategy.expiry_weekday),
            self.strategy.expiry_cutoff_hour,
        )
    }

    /// Initiates a fresh three-straddle ladder around the given spot.
    ///
    /// Sells both legs at `{center-step, center, center+step}` in ascending
    /// strike order, call before put: six orders, paced. Overwrites any
    /// prior ladder.
    ///
    /// # Errors
    /// `EngineError::Dhan` when the catalog cannot be loaded (fatal for the
    /// whole transition); per-leg failures are reported, not returned.
    pub async fn initiate(&mut self, spot: Decimal) -> Result<TransitionOutcome> {
        let center = Strike::round_from_spot(spot, self.strategy.strike_step);
        let next = Ladder::initiate(center, self.strategy.strike_step);
        info!(%spot, %center, ladder = %next, "initiate requested");

        let prompt = format!(
            "This will SELL 3 straddles at strikes: {next}. Proceed?"
        );
        if !self.gate.confirm(&prompt) {
            info!("initiate declined at confirmation gate");
            return Ok(TransitionOutcome::Declined);
        }

        let batch: Vec<(OptionLeg, TransactionSide)> = next
            .strikes()
            .iter()
            .flat_map(|s| OptionLeg::straddle(*s))
            .map(|leg| (leg, TransactionSide::Sell))
            .collect();

        let legs = self.execute_batch(&batch).await?;
        self.ladder = next;

        Ok(TransitionOutcome::Executed(TransitionReport {
            ladder: self.ladder.clone(),
            legs,
        }))
    }

    /// Parses a scraped price snippet and initiates.
    ///
    /// # Errors
    /// `EngineError::PriceParse` when no price can be derived; nothing is
    /// placed in that case.
    pub async fn initiate_from_snippet(&mut self, snippet: &str) -> Result<TransitionOutcome> {
        let spot = parse_spot_price(snippet)?;
        self.initiate(spot).await
    }

    /// Rolls the ladder up one step: buy back the lowest straddle, sell a
    /// new one above the highest.
    ///
    /// # Errors
    /// `EngineError::InvalidState` when the ladder is not active (checked
    /// before the confirmation prompt; the ladder is untouched).
    pub async fn roll_up(&mut self) -> Result<TransitionOutcome> {
        let plan = self.ladder.roll_up_plan(self.strategy.strike_step)?;
        self.execute_roll("Roll Up", plan).await
    }

    /// Rolls the ladder down one step: buy back the highest straddle, sell
    /// a new one below the lowest.
    ///
    /// # Errors
    /// `EngineError::InvalidState` when the ladder is not active.
    pub async fn roll_down(&mut self) -> Result<TransitionOutcome> {
        let plan = self.ladder.roll_down_plan(self.strategy.strike_step)?;
        self.execute_roll("Roll Down", plan).await
    }

    async fn execute_roll(
        &mut self,
        name: &str,
        plan: straddle_core::RollPlan,
    ) -> Result<TransitionOutcome> {
        info!(close = %plan.close, open = %plan.open, next = %plan.next, "{name} requested");

        let prompt = format!(
            "This will:\n- BUY back the {} straddle\n- SELL a new straddle at {}\n\nProceed?",
            plan.close, plan.open
        );
        if !self.gate.confirm(&prompt) {
            info!("{name} declined at confirmation gate");
            return Ok(TransitionOutcome::Declined);
        }

        let close = OptionLeg::straddle(plan.close);
        let open = OptionLeg::straddle(plan.open);
        let batch = [
            (close[0], TransactionSide::Buy),
            (close[1], TransactionSide::Buy),
            (open[0], TransactionSide::Sell),
            (open[1], TransactionSide::Sell),
        ];

        let legs = self.execute_batch(&batch).await?;
        self.ladder = plan.next;
        info!(ladder = %self.ladder, "{name} complete");

        Ok(TransitionOutcome::Executed(TransitionReport {
            ladder: self.ladder.clone(),
            legs,
        }))
    }

    /// Places a batch of legs strictly sequentially with pacing between
    /// submissions. Catalog load failure aborts the batch before the first
    /// order; leg-scoped failures (see [`DhanError::is_leg_scoped`]) are
    /// recorded and the batch continues, while session-scoped ones abort
    /// the remainder.
    async fn execute_batch(
        &self,
        batch: &[(OptionLeg, TransactionSide)],
    ) -> Result<Vec<LegOutcome>> {
        let catalog = self.catalog.get_or_load(&self.client).await?;
        let expiry = self.current_expiry();

        let mut outcomes = Vec::with_capacity(batch.len());
        for (i, (leg, side)) in batch.iter().enumerate() {
            if i > 0 {
                self.pacer.pause().await;
            }
            let detail = match self.place_leg(catalog, *leg, *side, expiry).await {
                Ok(receipt) => {
                    info!(leg = %leg, side = %side, order_id = %receipt.order_id, "leg placed");
                    LegDetail::Placed(receipt)
                }
                Err(err) if err.is_leg_scoped() => {
                    warn!(leg = %leg, side = %side, error = %err, "leg failed");
                    LegDetail::Failed(err)
                }
                Err(err) => return Err(err.into()),
            };
            outcomes.push(LegOutcome {
                leg: *leg,
                side: *side,
                detail,
            });
        }
        Ok(outcomes)
    }

    async fn place_leg(
        &self,
        catalog: &InstrumentCatalog,
        leg: OptionLeg,
        side: TransactionSide,
        expiry: NaiveDate,
    ) -> std::result::Result<OrderReceipt, DhanError> {
        let security_id = catalog.resolve(
            &self.strategy.underlying,
            leg.strike,
            leg.option_type,
            expiry,
        )?;
        let order = OrderRequest::market(
            self.client.client_id(),
            side,
            security_id,
            self.strategy.lot_quantity,
        );
        self.client.place_order(&order).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pacing::NoopPacer;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use straddle_core::AutoApprove;
    use straddle_dhan::{DhanClientConfig, SessionAuth};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    /// Gate that declines everything and counts how often it was asked.
    struct Decline(AtomicUsize);

    impl ConfirmationGate for Decline {
        fn confirm(&self, _prompt: &str) -> bool {
            self.0.fetch_add(1, Ordering::SeqCst);
            false
        }
    }

    fn scrip_master_for(expiry: NaiveDate, strikes: &[u32]) -> String {
        let mut lines = vec![
            "SEM_EXM_EXCH_ID,SEM_SEGMENT,SEM_INSTRUMENT_NAME,SEM_EXPIRY_DATE,SEM_STRIKE_PRICE,SEM_OPTION_TYPE,SEM_UNDERLYING_SYMBOL,SEM_SECURITY_ID"
                .to_string(),
        ];
        for strike in strikes {
            for code in ["CE", "PE"] {
                lines.push(format!(
                    "NSE,D,OPTIDX,{expiry},{strike}.000000,{code},NIFTY,{strike}{code}"
                ));
            }
        }
        lines.join("\n")
    }

    async fn mount_scrip_master(server: &MockServer, body: String) {
        Mock::given(method("GET"))
            .and(path("/api-scrip-master.csv"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(server)
            .await;
    }

    fn roller_for<G: ConfirmationGate>(
        server: &MockServer,
        gate: G,
    ) -> StraddleRoller<G, NoopPacer> {
        let config = DhanClientConfig::default()
            .with_base_url(server.uri())
            .with_scrip_master_url(format!("{}/api-scrip-master.csv", server.uri()));
        let auth = SessionAuth::new("test-token", "1100012345").unwrap();
        let client = Arc::new(DhanClient::new(config, auth).unwrap());
        StraddleRoller::new(
            client,
            Arc::new(CatalogCache::new()),
            StrategyConfig::default(),
            gate,
            NoopPacer,
        )
    }

    fn order_body(request: &Request) -> serde_json::Value {
        serde_json::from_slice(&request.body).unwrap()
    }

    #[tokio::test]
    async fn initiate_places_six_sells_in_ladder_order() {
        let server = MockServer::start().await;
        let roller_probe = roller_for(&server, AutoApprove);
        let expiry = roller_probe.current_expiry();
        mount_scrip_master(
            &server,
            scrip_master_for(expiry, &[24800, 24850, 24900]),
        )
        .await;

        Mock::given(method("POST"))
            .and(path("/v2/orders"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "orderId": "ord-1", "orderStatus": "TRANSIT"
            })))
            .expect(6)
            .mount(&server)
            .await;

        let mut roller = roller_probe;
        let outcome = roller.initiate(dec!(24837)).await.unwrap();

        let report = match outcome {
            TransitionOutcome::Executed(report) => report,
            TransitionOutcome::Declined => panic!("auto-approve should not decline"),
        };
        assert!(report.all_placed());
        assert_eq!(
            roller.ladder().strikes(),
            &[Strike(24800), Strike(24850), Strike(24900)]
        );

        // Ascending strikes, call before put at each.
        let expected = [
            "24800CE", "24800PE", "24850CE", "24850PE", "24900CE", "24900PE",
        ];
        let requests = server.received_requests().await.unwrap();
        let order_ids: Vec<String> = requests
            .iter()
            .filter(|r| r.url.path() == "/v2/orders")
            .map(|r| order_body(r)["securityId"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(order_ids, expected);

        for request in requests.iter().filter(|r| r.url.path() == "/v2/orders") {
            let body = order_body(request);
            assert_eq!(body["transactionType"], "SELL");
            assert_eq!(body["orderType"], "MARKET");
            assert_eq!(body["validity"], "DAY");
            assert_eq!(body["productType"], "INTRADAY");
            assert_eq!(body["quantity"], 50);
        }
    }

    #[tokio::test]
    async fn declined_confirmation_places_nothing() {
        let server = MockServer::start().await;
        let mut roller = roller_for(&server, Decline(AtomicUsize::new(0)));

        let outcome = roller.initiate(dec!(24837)).await.unwrap();
        assert!(matches!(outcome, TransitionOutcome::Declined));
        assert!(!roller.ladder().is_active());
        // No catalog fetch, no orders: the gate sits before any network
        // effect.
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn roll_up_buys_back_low_and_sells_new_high() {
        let server = MockServer::start().await;
        let probe = roller_for(&server, AutoApprove);
        let expiry = probe.current_expiry();
        mount_scrip_master(&server, scrip_master_for(expiry, &[24800, 24950])).await;

        Mock::given(method("POST"))
            .and(path("/v2/orders"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "orderId": "ord-2"
            })))
            .expect(4)
            .mount(&server)
            .await;

        let ladder =
            Ladder::from_observed(vec![Strike(24800), Strike(24850), Strike(24900)]).unwrap();
        let mut roller = probe.with_ladder(ladder);

        let outcome = roller.roll_up().await.unwrap();
        let report = match outcome {
            TransitionOutcome::Executed(report) => report,
            TransitionOutcome::Declined => panic!("unexpected decline"),
        };
        assert!(report.all_placed());
        assert_eq!(
            roller.ladder().strikes(),
            &[Strike(24850), Strike(24900), Strike(24950)]
        );

        let requests = server.received_requests().await.unwrap();
        let orders: Vec<(String, String)> = requests
            .iter()
            .filter(|r| r.url.path() == "/v2/orders")
            .map(|r| {
                let body = order_body(r);
                (
                    body["transactionType"].as_str().unwrap().to_string(),
                    body["securityId"].as_str().unwrap().to_string(),
                )
            })
            .collect();
        assert_eq!(
            orders,
            vec![
                ("BUY".to_string(), "24800CE".to_string()),
                ("BUY".to_string(), "24800PE".to_string()),
                ("SELL".to_string(), "24950CE".to_string()),
                ("SELL".to_string(), "24950PE".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn roll_down_mirrors_roll_up() {
        let server = MockServer::start().await;
        let probe = roller_for(&server, AutoApprove);
        let expiry = probe.current_expiry();
        mount_scrip_master(&server, scrip_master_for(expiry, &[24750, 24900])).await;

        Mock::given(method("POST"))
            .and(path("/v2/orders"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "orderId": "ord-3"
            })))
            .mount(&server)
            .await;

        let ladder =
            Ladder::from_observed(vec![Strike(24800), Strike(24850), Strike(24900)]).unwrap();
        let mut roller = probe.with_ladder(ladder);

        roller.roll_down().await.unwrap();
        assert_eq!(
            roller.ladder().strikes(),
            &[Strike(24750), Strike(24800), Strike(24850)]
        );
    }

    #[tokio::test]
    async fn roll_without_active_ladder_is_invalid_state() {
        let server = MockServer::start().await;
        let mut roller = roller_for(&server, AutoApprove);

        let err = roller.roll_up().await.unwrap_err();
        assert!(matches!(err, EngineError::InvalidState(_)));
        assert!(!roller.ladder().is_active());
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_contract_skips_that_leg_and_continues() {
        let server = MockServer::start().await;
        let probe = roller_for(&server, AutoApprove);
        let expiry = probe.current_expiry();
        // 24900 CE/PE are absent from the catalog.
        mount_scrip_master(&server, scrip_master_for(expiry, &[24800, 24850])).await;

        Mock::given(method("POST"))
            .and(path("/v2/orders"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "orderId": "ord-4"
            })))
            .expect(4)
            .mount(&server)
            .await;

        let mut roller = probe;
        let outcome = roller.initiate(dec!(24837)).await.unwrap();
        let report = match outcome {
            TransitionOutcome::Executed(report) => report,
            TransitionOutcome::Declined => panic!("unexpected decline"),
        };

        assert!(!report.all_placed());
        let failures: Vec<_> = report.failures().collect();
        assert_eq!(failures.len(), 2);
        for failure in &failures {
            assert_eq!(failure.leg.strike, Strike(24900));
            match &failure.detail {
                LegDetail::Failed(DhanError::InstrumentNotFound { strike, .. }) => {
                    assert_eq!(*strike, Strike(24900));
                }
                other => panic!("expected InstrumentNotFound, got {other:?}"),
            }
        }
        // Ladder still advances to the intended strikes (best-effort policy).
        assert_eq!(
            roller.ladder().strikes(),
            &[Strike(24800), Strike(24850), Strike(24900)]
        );
    }

    #[tokio::test]
    async fn rejected_leg_is_reported_and_batch_continues() {
        let server = MockServer::start().await;
        let probe = roller_for(&server, AutoApprove);
        let expiry = probe.current_expiry();
        mount_scrip_master(&server, scrip_master_for(expiry, &[24800, 24850, 24900])).await;

        // Every order is rejected; all six legs still get attempted.
        Mock::given(method("POST"))
            .and(path("/v2/orders"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "errorType": "Order_Error",
                "errorMessage": "RMS blocked"
            })))
            .expect(6)
            .mount(&server)
            .await;

        let mut roller = probe;
        let outcome = roller.initiate(dec!(24837)).await.unwrap();
        let report = match outcome {
            TransitionOutcome::Executed(report) => report,
            TransitionOutcome::Declined => panic!("unexpected decline"),
        };
        assert_eq!(report.failures().count(), 6);
        // Rejections are leg-scoped, which is what lets the batch continue.
        for failure in report.failures() {
            match &failure.detail {
                LegDetail::Failed(err) => assert!(err.is_leg_scoped()),
                LegDetail::Placed(_) => panic!("expected a failed leg"),
            }
        }
        assert!(roller.ladder().is_active());
    }

    #[tokio::test]
    async fn catalog_failure_aborts_the_whole_transition() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api-scrip-master.csv"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let mut roller = roller_for(&server, AutoApprove);
        let err = roller.initiate(dec!(24837)).await.unwrap_err();
        assert!(matches!(err, EngineError::Dhan(DhanError::CatalogLoad(_))));

        // No orders were attempted.
        let requests = server.received_requests().await.unwrap();
        assert!(requests.iter().all(|r| r.url.path() != "/v2/orders"));
    }

    #[tokio::test]
    async fn price_snippet_parse_failure_has_no_side_effects() {
        let server = MockServer::start().await;
        let mut roller = roller_for(&server, AutoApprove);

        let err = roller.initiate_from_snippet("loading...").await.unwrap_err();
        assert!(matches!(err, EngineError::PriceParse(_)));
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
