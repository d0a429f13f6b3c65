//! Instruction-level checks against both programs on solana-program-test.
//! Needs the `.so` files from `anchor build`, like the fuzz targets.

use fuzz_helpers::*;
use solana_sdk::signature::Signer;

const SEED: u64 = 1_000_000;
const USER_BALANCE: u64 = 1_000_000;

async fn environment() -> (FuzzTestEnv, CompleteSetup) {
    setup_complete_environment(USER_BALANCE, 6, SEED, 1_000)
        .await
        .unwrap()
}

#[tokio::test]
async fn deposit_cannot_credit_another_holder() {
    let (mut env, setup) = environment().await;
    let other = setup_user_accounts(&mut env, &setup.protocol, &setup.vault)
        .await
        .unwrap();

    let ix = deposit_ix_into(&env, &setup, 10_000, other.share_token_account);
    assert!(send_as_user(&mut env, &setup, ix).await.is_err());

    assert_eq!(
        get_token_balance(&mut env.context, &other.share_token_account)
            .await
            .unwrap(),
        0
    );
    assert_eq!(
        get_token_balance(&mut env.context, &setup.user.underlying_token_account)
            .await
            .unwrap(),
        USER_BALANCE
    );

    // The same deposit into the depositor's own account goes through
    let ix = deposit_ix(&env, &setup, 10_000);
    send_as_user(&mut env, &setup, ix).await.unwrap();
    assert_eq!(
        get_token_balance(&mut env.context, &setup.user.share_token_account)
            .await
            .unwrap(),
        10_000
    );
}

#[tokio::test]
async fn mint_pulls_the_share_cost_from_the_depositor() {
    let (mut env, setup) = environment().await;

    let ix = mint_ix(&env, &setup, 5_000);
    send_as_user(&mut env, &setup, ix).await.unwrap();

    assert_eq!(
        get_token_balance(&mut env.context, &setup.user.share_token_account)
            .await
            .unwrap(),
        5_000
    );
    assert_eq!(
        get_token_balance(&mut env.context, &setup.user.underlying_token_account)
            .await
            .unwrap(),
        USER_BALANCE - 5_000
    );

    let vault = get_vault_state(&mut env.context, &setup.vault.vault)
        .await
        .unwrap();
    let live = get_position_balance(&mut env.context, &setup.reserve, &setup.vault)
        .await
        .unwrap();
    assert_eq!(vault.ledger.checkpoint_balance, live);
    assert_eq!(live, SEED + 5_000);
}

#[tokio::test]
async fn fee_rate_change_and_collection_settle_against_the_position() {
    let (mut env, setup) = environment().await;

    let ix = set_fee_rate_ix(&env, &setup, 2_000);
    send_as_owner(&mut env, &setup, ix).await.unwrap();
    let vault = get_vault_state(&mut env.context, &setup.vault.vault)
        .await
        .unwrap();
    assert_eq!(vault.ledger.fee_rate_bps, 2_000);
    assert_eq!(vault.ledger.accumulated_fees, 0);

    // Nothing has accrued yet
    let ix = collect_fees_ix(&env, &setup);
    assert!(send_as_owner(&mut env, &setup, ix).await.is_err());

    donate_to_reserve(&mut env.context, &setup.underlying, &setup.reserve, 100_000)
        .await
        .unwrap();

    let ix = collect_fees_ix(&env, &setup);
    send_as_owner(&mut env, &setup, ix).await.unwrap();

    let collected = get_token_balance(&mut env.context, &setup.vault.treasury)
        .await
        .unwrap();
    assert!(collected > 0);
    assert!(collected <= 20_000);

    let vault = get_vault_state(&mut env.context, &setup.vault.vault)
        .await
        .unwrap();
    let live = get_position_balance(&mut env.context, &setup.reserve, &setup.vault)
        .await
        .unwrap();
    assert_eq!(vault.ledger.accumulated_fees, 0);
    assert_eq!(vault.ledger.checkpoint_balance, live);
}

#[tokio::test]
async fn fee_handlers_refuse_a_non_owner() {
    let (mut env, setup) = environment().await;

    let mut ix = set_fee_rate_ix(&env, &setup, 2_000);
    // The depositor signs in place of the owner
    ix.accounts
        .iter_mut()
        .filter(|meta| meta.pubkey == setup.protocol.owner)
        .for_each(|meta| meta.pubkey = setup.user.owner.pubkey());
    assert!(send_as_user(&mut env, &setup, ix).await.is_err());

    let vault = get_vault_state(&mut env.context, &setup.vault.vault)
        .await
        .unwrap();
    assert_eq!(vault.ledger.fee_rate_bps, 1_000);
}
