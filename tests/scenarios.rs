#![allow(non_snake_case)]

use alloy::primitives::{
    Address,
    U256,
    utils::parse_ether,
};
use etherball::{
    ContractInterface,
    config::HistoryConfig,
    error::SimulationError,
    game::{
        DifficultyTier,
        GameContextSource,
    },
    history::{
        HistoryEngine,
        fetcher::LogFetcher,
    },
    numbers::NumberGenerator,
    purchase::{
        FailureKind,
        PurchaseAttempt,
        PurchaseOrchestrator,
        TicketSheet,
        TransactionState,
    },
    test_helpers::{
        FakeGameContextSource,
        FakeGateway,
        FakeLogSource,
        FakeStatusSource,
        GatewayCall,
        TEST_CONTRACT,
        TEST_PAYER,
        sample_game,
        ticket_log,
    },
    validation::validate_range,
};
use rand::{
    SeedableRng,
    rngs::StdRng,
};

fn seeded(gateway: &FakeGateway) -> PurchaseOrchestrator<FakeGateway, StdRng> {
    PurchaseOrchestrator::with_generator(
        gateway.clone(),
        NumberGenerator::new(StdRng::seed_from_u64(2024)),
    )
}

#[tokio::test]
async fn buy__three_auto_tickets_on_easy__prices_exactly_and_confirms() {
    // given
    let gateway = FakeGateway::new();
    let status = FakeStatusSource::confirmed();
    let source = FakeGameContextSource::new(Some(sample_game(DifficultyTier::Easy)));
    let game = source.game_context().await.unwrap();
    let mut sheet = TicketSheet::new();
    assert!(sheet.set_ticket_count(3));
    let mut orchestrator = seeded(&gateway);

    // when
    orchestrator
        .purchase_and_confirm(&status, Some(&game), Some(TEST_PAYER), &sheet.selection())
        .await
        .unwrap();

    // then
    let calls = gateway.calls();
    let GatewayCall::Simulate(request) = &calls[0] else {
        panic!("expected a simulation first");
    };
    assert_eq!(request.tickets.len(), 3);
    for ticket in &request.tickets {
        assert!(validate_range(ticket, DifficultyTier::Easy));
        assert!(ticket.main().iter().all(|n| (1..=50).contains(n)));
        assert!((1..=10).contains(&ticket.etherball()));
    }
    assert_eq!(request.total_value, parse_ether("0.03").unwrap());
    assert_eq!(
        request.total_value,
        sheet.total_cost(&game.ticket_price).unwrap()
    );
    assert!(matches!(orchestrator.state(), TransactionState::Success(Some(_))));
}

#[tokio::test]
async fn buy__insufficient_funds__fails_without_submitting() {
    // given
    let gateway = FakeGateway::rejecting_simulation(SimulationError::reverted(
        "execution reverted: insufficient funds",
    ));
    let status = FakeStatusSource::confirmed();
    let game = sample_game(DifficultyTier::Medium);
    let mut orchestrator = seeded(&gateway);

    // when
    let attempt = orchestrator
        .purchase_and_confirm(
            &status,
            Some(&game),
            Some(TEST_PAYER),
            &TicketSheet::new().selection(),
        )
        .await
        .unwrap();

    // then
    assert!(matches!(attempt, PurchaseAttempt::Rejected(_)));
    let state = orchestrator.state();
    let failure = state.failure().unwrap();
    assert_eq!(failure.kind, FailureKind::InsufficientFunds);
    assert_eq!(failure.user_message(), "Insufficient funds");
    assert_eq!(gateway.submit_count(), 0);
    assert!(status.waited().is_empty());
}

#[tokio::test]
async fn buy__game_context_unavailable__makes_no_calls() {
    // given
    let gateway = FakeGateway::new();
    let source = FakeGameContextSource::new(None);
    let game = source.game_context().await.ok();
    let mut orchestrator = seeded(&gateway);

    // when
    let attempt = orchestrator
        .purchase(game.as_ref(), Some(TEST_PAYER), &TicketSheet::new().selection())
        .await
        .unwrap();

    // then
    assert_eq!(attempt, PurchaseAttempt::GameUnavailable);
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn history__log_transport_error__is_empty_and_not_loading() {
    // given
    let source = FakeLogSource::new(
        40_000,
        vec![ticket_log(Address::ZERO, 1, [1, 2, 3], 4, 39_999, 0)],
    )
    .failing_logs("upstream connect error");
    let fetcher = LogFetcher::new(
        source.clone(),
        TEST_CONTRACT,
        ContractInterface::lottery().unwrap(),
    );
    let mut engine = HistoryEngine::new(fetcher, HistoryConfig::default());

    // when
    let tickets = engine.load_latest().await;

    // then
    assert!(tickets.is_empty());
    assert!(!engine.is_loading());
    let queries = source.queries();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].from_block, 30_000);
    assert_eq!(queries[0].to_block, 40_000);
}

#[tokio::test]
async fn history__many_purchases__never_exceed_display_cap() {
    // given
    let player = Address::repeat_byte(7);
    let logs = (0..250u64)
        .map(|i| ticket_log(player, 5, [1, 2, 3], 4, 900, i))
        .collect();
    let fetcher = LogFetcher::new(
        FakeLogSource::new(1_000, logs),
        TEST_CONTRACT,
        ContractInterface::lottery().unwrap(),
    );
    let mut engine = HistoryEngine::new(fetcher, HistoryConfig::default());

    // when
    let tickets = engine.load_latest().await.to_vec();

    // then
    assert_eq!(tickets.len(), 100);
    assert_eq!(tickets[0].log_index, Some(0));
    assert_eq!(tickets[99].log_index, Some(99));
    assert_eq!(engine.tickets_for(player, 5).len(), 100);
    assert!(engine.tickets_for(player, 6).is_empty());
}

#[tokio::test]
async fn sheet__manual_tickets__reach_the_contract_call_unchanged() {
    // given
    let gateway = FakeGateway::new();
    let game = sample_game(DifficultyTier::Hard);
    let mut sheet = TicketSheet::new();
    sheet.toggle_auto_generate();
    for (slot, value) in [150, 75, 1, 20].into_iter().enumerate() {
        sheet.set_number(0, slot, value);
    }
    let mut orchestrator = seeded(&gateway);

    // when
    orchestrator
        .purchase(Some(&game), Some(TEST_PAYER), &sheet.selection())
        .await
        .unwrap();

    // then
    let calls = gateway.calls();
    let GatewayCall::Submit(request) = &calls[1] else {
        panic!("expected a submission second");
    };
    assert_eq!(
        request.call_args(),
        vec![[
            U256::from(150),
            U256::from(75),
            U256::from(1),
            U256::from(20)
        ]]
    );
}
