#![no_main]

use arbitrary::Arbitrary;
use fuzz_helpers::*;
use libfuzzer_sys::fuzz_target;
use solana_sdk::signature::Signer;
use yield_vault::accounting::{to_assets, to_shares, Rounding};

/// Deposit into a vault whose lending position has gained or lost value,
/// then redeem everything that was minted.
#[derive(Debug, Clone, Arbitrary)]
struct DepositFuzzInput {
    amount: u64,
    initial_balance: u64,
    decimals: u8,
    seed_assets: u32,
    fee_rate_bps: u16,
    /// Donated into the reserve before the deposit
    yield_amount: u64,
    /// Slashed from the reserve after the donation
    loss_amount: u64,
    do_initial_deposit: bool,
    initial_deposit_amount: u64,
}

const ACCEPTABLE_ERRORS: [&str; 6] = [
    "ZeroResult",
    "ExceedsBound",
    "SupplyCapExceeded",
    "InsufficientFunds",
    "MathOverflow",
    "InvalidAmount",
];

fn check_failure(error: &dyn std::error::Error, input: &DepositFuzzInput) {
    let error_string = format!("{:?}", error);
    let is_acceptable = ACCEPTABLE_ERRORS
        .iter()
        .any(|pattern| error_string.contains(pattern));

    if !is_acceptable {
        panic!("Unexpected error: {}\nInput: {:?}", error_string, input);
    }
}

/// Fees plus depositor assets must equal the position right after an operation
async fn assert_restamped(env: &mut FuzzTestEnv, setup: &CompleteSetup) -> FuzzResult<()> {
    let vault = get_vault_state(&mut env.context, &setup.vault.vault).await?;
    let live = get_position_balance(&mut env.context, &setup.reserve, &setup.vault).await?;

    assert_eq!(
        vault.ledger.checkpoint_balance, live,
        "checkpoint not restamped to the post-transfer balance"
    );
    assert!(
        vault.ledger.accumulated_fees <= vault.ledger.checkpoint_balance,
        "fees {} exceed checkpoint {}",
        vault.ledger.accumulated_fees,
        vault.ledger.checkpoint_balance
    );
    Ok(())
}

async fn fuzz_deposit_once(input: DepositFuzzInput) -> FuzzResult<()> {
    let amount = input.amount.max(1) % 1_000_000_000_000;
    let decimals = input.decimals % 19;
    let seed_assets = (input.seed_assets as u64).max(1);
    let fee_rate_bps = input.fee_rate_bps % 10_001;
    let yield_amount = input.yield_amount % 1_000_000_000;
    let initial_deposit = input.initial_deposit_amount.max(1) % 1_000_000_000_000;

    let mut total_needed = amount;
    if input.do_initial_deposit {
        total_needed = total_needed.saturating_add(initial_deposit);
    }
    let initial_balance = (input.initial_balance % 1_000_000_000).saturating_add(total_needed);

    let (mut env, setup) =
        match setup_complete_environment(initial_balance, decimals, seed_assets, fee_rate_bps)
            .await
        {
            Ok(result) => result,
            Err(e) => {
                eprintln!("Setup failed: {}", e);
                return Ok(());
            }
        };

    if input.do_initial_deposit {
        let ix = deposit_ix(&env, &setup, initial_deposit);
        if send_as_user(&mut env, &setup, ix).await.is_err() {
            return Ok(());
        }
    }

    if yield_amount > 0 {
        donate_to_reserve(&mut env.context, &setup.underlying, &setup.reserve, yield_amount)
            .await?;
    }

    let liquidity = get_token_balance(&mut env.context, &setup.reserve.liquidity_account).await?;
    let loss_amount = input.loss_amount % liquidity.max(1);
    if loss_amount > 0 {
        slash_reserve(&mut env, &setup.underlying, &setup.reserve, loss_amount).await?;
    }

    // Expected outcome, priced the way the vault prices it
    let vault_before = get_vault_state(&mut env.context, &setup.vault.vault).await?;
    let live_before = get_position_balance(&mut env.context, &setup.reserve, &setup.vault).await?;
    let total_assets_before = vault_before.ledger.live_total_assets(live_before)?;
    let share_supply_before = get_mint_supply(&mut env.context, &setup.vault.share_mint).await?;
    let expected_shares = to_shares(
        amount,
        total_assets_before,
        share_supply_before,
        Rounding::Floor,
    )?;

    let liquidity_before =
        get_token_balance(&mut env.context, &setup.reserve.liquidity_account).await?;
    let user_balance_before =
        get_token_balance(&mut env.context, &setup.user.underlying_token_account).await?;
    let user_shares_before =
        get_token_balance(&mut env.context, &setup.user.share_token_account).await?;

    let ix = deposit_ix(&env, &setup, amount);
    if let Err(e) = send_as_user(&mut env, &setup, ix).await {
        check_failure(e.as_ref(), &input);
        return Ok(());
    }

    let liquidity_after =
        get_token_balance(&mut env.context, &setup.reserve.liquidity_account).await?;
    let user_balance_after =
        get_token_balance(&mut env.context, &setup.user.underlying_token_account).await?;
    let user_shares_after =
        get_token_balance(&mut env.context, &setup.user.share_token_account).await?;
    let staging = get_token_balance(&mut env.context, &setup.vault.vault_token_account).await?;
    let shares_minted = user_shares_after - user_shares_before;

    // ========================================
    // CONSERVATION
    // ========================================

    assert_eq!(
        liquidity_before + user_balance_before,
        liquidity_after + user_balance_after,
        "Token conservation violated: liquidity {}->{}, user {}->{}",
        liquidity_before,
        liquidity_after,
        user_balance_before,
        user_balance_after
    );
    assert_eq!(staging, 0, "Deposit left tokens in the staging account");

    // ========================================
    // PRICING
    // ========================================

    assert_eq!(
        shares_minted, expected_shares,
        "Minted shares differ from the preview against pre-deposit totals"
    );
    assert!(shares_minted > 0, "Deposit of {} minted zero shares", amount);

    assert_restamped(&mut env, &setup).await?;

    // The fee balance is untouched by principal, and the market never credits
    // more than was supplied
    let vault_after = get_vault_state(&mut env.context, &setup.vault.vault).await?;
    let live_after = get_position_balance(&mut env.context, &setup.reserve, &setup.vault).await?;
    assert_eq!(
        vault_after.ledger.accumulated_fees,
        vault_before.ledger.live_fees(live_before)?,
        "Deposit principal leaked into the fee balance"
    );
    assert!(
        live_after <= live_before + amount,
        "Position grew by more than the deposit: {} -> {} (+{})",
        live_before,
        live_after,
        amount
    );
    let total_assets_after = vault_after.ledger.depositor_assets()?;
    let share_supply_after = get_mint_supply(&mut env.context, &setup.vault.share_mint).await?;
    assert_eq!(share_supply_after, share_supply_before + shares_minted);

    // ========================================
    // EXIT
    // ========================================

    let redeemable = to_assets(
        user_shares_after,
        total_assets_after,
        share_supply_after,
        Rounding::Floor,
    )?;

    let ix = redeem_ix(&env, &setup, user_shares_after);
    if let Err(e) = send_as_user(&mut env, &setup, ix).await {
        check_failure(e.as_ref(), &input);
        return Ok(());
    }

    let user_balance_final =
        get_token_balance(&mut env.context, &setup.user.underlying_token_account).await?;
    assert_eq!(
        user_balance_final - user_balance_after,
        redeemable,
        "Redeem paid something other than the floor-rounded share value"
    );
    assert_eq!(
        get_token_balance(&mut env.context, &setup.user.share_token_account).await?,
        0
    );

    assert_restamped(&mut env, &setup).await?;

    println!(
        "PASS deposit={} shares={} redeemed={} fee_rate={} yield={} loss={} user={}",
        amount,
        shares_minted,
        redeemable,
        fee_rate_bps,
        yield_amount,
        loss_amount,
        setup.user.owner.pubkey()
    );

    Ok(())
}

fuzz_target!(|input: DepositFuzzInput| {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    runtime.block_on(async {
        if let Err(e) = fuzz_deposit_once(input).await {
            eprintln!("Fuzz iteration failed: {}", e);
        }
    });
});
