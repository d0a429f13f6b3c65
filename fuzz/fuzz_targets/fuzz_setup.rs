use anchor_lang::AccountDeserialize;
use anchor_lang::InstructionData;
use anchor_lang::ToAccountMetas;
use lending_market::state::{Position, Reserve};
use solana_program_test::*;
use solana_sdk::{
    compute_budget::ComputeBudgetInstruction,
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    transaction::Transaction,
};
use spl_token::instruction as token_instruction;
use yield_vault::state::Vault;

pub use solana_program_test::ProgramTestContext;

pub type FuzzResult<T> = std::result::Result<T, Box<dyn std::error::Error>>;

const MINT_LEN: usize = 82;
const TOKEN_ACCOUNT_LEN: usize = 165;

/// Both programs loaded from their built `.so` files
pub struct FuzzTestEnv {
    pub program_id: Pubkey,
    pub lending_program_id: Pubkey,
    pub context: ProgramTestContext,
}

#[derive(Debug)]
pub struct ProtocolAccounts {
    pub protocol_state: Pubkey,
    pub vault_authority: Pubkey,
    pub owner: Pubkey,
    pub owner_keypair: Keypair,
}

#[derive(Debug)]
pub struct UnderlyingMintAccounts {
    pub mint: Pubkey,
    pub mint_authority: Keypair,
    pub decimals: u8,
}

#[derive(Debug)]
pub struct ReserveAccounts {
    pub reserve: Pubkey,
    pub liquidity_account: Pubkey,
    pub authority: Keypair,
    /// Receives slashed liquidity
    pub sink: Pubkey,
}

#[derive(Debug, Clone)]
pub struct VaultAccounts {
    pub vault: Pubkey,
    pub vault_token_account: Pubkey,
    pub share_mint: Pubkey,
    pub seed_share_account: Pubkey,
    pub position: Pubkey,
    pub treasury: Pubkey,
    pub underlying_mint: Pubkey,
}

#[derive(Debug)]
pub struct UserAccounts {
    pub owner: Keypair,
    pub underlying_token_account: Pubkey,
    pub share_token_account: Pubkey,
    pub depositor_record: Pubkey,
}

pub struct CompleteSetup {
    pub protocol: ProtocolAccounts,
    pub underlying: UnderlyingMintAccounts,
    pub reserve: ReserveAccounts,
    pub vault: VaultAccounts,
    pub user: UserAccounts,
}

// ============================================================================
// Core Setup Functions
// ============================================================================

pub async fn setup_program_test() -> FuzzTestEnv {
    let program_id = yield_vault::id();
    let lending_program_id = lending_market::id();

    let mut program_test = ProgramTest::new("yield_vault", program_id, None);
    program_test.add_program("lending_market", lending_program_id, None);

    let context = program_test.start_with_context().await;

    FuzzTestEnv {
        program_id,
        lending_program_id,
        context,
    }
}

async fn send(
    context: &mut ProgramTestContext,
    instructions: &[Instruction],
    payer: &Keypair,
    extra_signers: &[&Keypair],
) -> FuzzResult<()> {
    let mut signers = vec![payer];
    signers.extend_from_slice(extra_signers);

    let blockhash = context.banks_client.get_latest_blockhash().await?;
    let tx = Transaction::new_signed_with_payer(
        instructions,
        Some(&payer.pubkey()),
        &signers,
        blockhash,
    );

    context.banks_client.process_transaction(tx).await?;
    Ok(())
}

async fn fund(context: &mut ProgramTestContext, to: &Pubkey) -> FuzzResult<()> {
    let rent = context.banks_client.get_rent().await?;
    let lamports = rent.minimum_balance(0) + 1_000_000_000; // 1 SOL

    let ix = solana_sdk::system_instruction::transfer(&context.payer.pubkey(), to, lamports);
    let payer = context.payer.insecure_clone();
    send(context, &[ix], &payer, &[]).await
}

/// Creates and initializes an SPL token account owned by `owner`
pub async fn create_token_account(
    context: &mut ProgramTestContext,
    mint: &Pubkey,
    owner: &Pubkey,
) -> FuzzResult<Pubkey> {
    let account = Keypair::new();
    let rent = context.banks_client.get_rent().await?;

    let create_ix = solana_sdk::system_instruction::create_account(
        &context.payer.pubkey(),
        &account.pubkey(),
        rent.minimum_balance(TOKEN_ACCOUNT_LEN),
        TOKEN_ACCOUNT_LEN as u64,
        &spl_token::id(),
    );
    let init_ix =
        token_instruction::initialize_account(&spl_token::id(), &account.pubkey(), mint, owner)?;

    let payer = context.payer.insecure_clone();
    send(context, &[create_ix, init_ix], &payer, &[&account]).await?;

    Ok(account.pubkey())
}

pub async fn setup_protocol(
    context: &mut ProgramTestContext,
    program_id: &Pubkey,
) -> FuzzResult<ProtocolAccounts> {
    let owner_keypair = Keypair::new();
    let owner = owner_keypair.pubkey();
    fund(context, &owner).await?;

    let (protocol_state, _) = derive_protocol_state_pda(program_id);
    let (vault_authority, _) = derive_vault_authority_pda(program_id);

    let accounts = yield_vault::accounts::Initialize {
        protocol_state,
        vault_authority,
        owner,
        payer: owner,
        system_program: solana_sdk::system_program::ID,
    };

    let ix = Instruction {
        program_id: *program_id,
        accounts: accounts.to_account_metas(None),
        data: yield_vault::instruction::Initialize {}.data(),
    };

    send(context, &[ix], &owner_keypair, &[]).await?;

    Ok(ProtocolAccounts {
        protocol_state,
        vault_authority,
        owner,
        owner_keypair,
    })
}

pub async fn setup_underlying_mint(
    context: &mut ProgramTestContext,
    decimals: u8,
) -> FuzzResult<UnderlyingMintAccounts> {
    let mint_authority = Keypair::new();
    let mint_keypair = Keypair::new();
    let mint = mint_keypair.pubkey();

    let rent = context.banks_client.get_rent().await?;

    let create_account_ix = solana_sdk::system_instruction::create_account(
        &context.payer.pubkey(),
        &mint,
        rent.minimum_balance(MINT_LEN),
        MINT_LEN as u64,
        &spl_token::id(),
    );

    let init_mint_ix = token_instruction::initialize_mint(
        &spl_token::id(),
        &mint,
        &mint_authority.pubkey(),
        None,
        decimals,
    )?;

    let payer = context.payer.insecure_clone();
    send(context, &[create_account_ix, init_mint_ix], &payer, &[&mint_keypair]).await?;

    Ok(UnderlyingMintAccounts {
        mint,
        mint_authority,
        decimals,
    })
}

/// Creates the lending reserve for `mint` plus a token account to slash into.
pub async fn setup_reserve(
    context: &mut ProgramTestContext,
    lending_program_id: &Pubkey,
    underlying: &UnderlyingMintAccounts,
    supply_cap: u64,
) -> FuzzResult<ReserveAccounts> {
    let authority = Keypair::new();
    fund(context, &authority.pubkey()).await?;

    let (reserve, _) = derive_reserve_pda(lending_program_id, &underlying.mint);
    let (liquidity_account, _) = derive_liquidity_pda(lending_program_id, &reserve);

    let accounts = lending_market::accounts::InitReserve {
        reserve,
        liquidity_mint: underlying.mint,
        liquidity_account,
        authority: authority.pubkey(),
        system_program: solana_sdk::system_program::ID,
        token_program: spl_token::id(),
    };

    let ix = Instruction {
        program_id: *lending_program_id,
        accounts: accounts.to_account_metas(None),
        data: lending_market::instruction::InitReserve { supply_cap }.data(),
    };

    send(context, &[ix], &authority, &[]).await?;

    let sink = create_token_account(context, &underlying.mint, &authority.pubkey()).await?;

    Ok(ReserveAccounts {
        reserve,
        liquidity_account,
        authority,
        sink,
    })
}

pub async fn setup_vault(
    env: &mut FuzzTestEnv,
    protocol: &ProtocolAccounts,
    underlying: &UnderlyingMintAccounts,
    reserve: &ReserveAccounts,
    seed_assets: u64,
    fee_rate_bps: u16,
) -> FuzzResult<VaultAccounts> {
    let program_id = env.program_id;
    let context = &mut env.context;
    let owner = &protocol.owner_keypair;

    let (vault, _) = derive_vault_pda(&program_id, &underlying.mint);
    let (share_mint, _) = derive_share_mint_pda(&program_id, &vault);
    let (vault_token_account, _) = derive_vault_token_account_pda(&program_id, &vault);
    let (seed_share_account, _) = derive_seed_shares_pda(&program_id, &vault);
    let (position, _) = derive_position_pda(
        &env.lending_program_id,
        &reserve.reserve,
        &protocol.vault_authority,
    );

    let treasury = create_token_account(context, &underlying.mint, &owner.pubkey()).await?;
    let payer_token_account =
        create_token_account(context, &underlying.mint, &owner.pubkey()).await?;
    mint_tokens_to(
        context,
        &underlying.mint,
        &underlying.mint_authority,
        &payer_token_account,
        seed_assets,
    )
    .await?;

    let accounts = yield_vault::accounts::InitializeVault {
        protocol_state: protocol.protocol_state,
        vault,
        underlying_mint: underlying.mint,
        vault_token_account,
        share_mint,
        seed_share_account,
        vault_authority: protocol.vault_authority,
        reserve: reserve.reserve,
        liquidity_account: reserve.liquidity_account,
        position,
        treasury,
        payer_token_account,
        owner: owner.pubkey(),
        payer: owner.pubkey(),
        lending_program: env.lending_program_id,
        system_program: solana_sdk::system_program::ID,
        token_program: spl_token::id(),
    };

    let ix = Instruction {
        program_id,
        accounts: accounts.to_account_metas(None),
        data: yield_vault::instruction::InitializeVault {
            seed_assets,
            fee_rate_bps,
        }
        .data(),
    };

    let budget_ix = ComputeBudgetInstruction::set_compute_unit_limit(400_000);
    send(context, &[budget_ix, ix], owner, &[]).await?;

    Ok(VaultAccounts {
        vault,
        vault_token_account,
        share_mint,
        seed_share_account,
        position,
        treasury,
        underlying_mint: underlying.mint,
    })
}

/// Creates a funded user with token accounts and an active allow-list record
pub async fn setup_user_accounts(
    env: &mut FuzzTestEnv,
    protocol: &ProtocolAccounts,
    vault: &VaultAccounts,
) -> FuzzResult<UserAccounts> {
    let program_id = env.program_id;
    let context = &mut env.context;
    let owner = Keypair::new();
    fund(context, &owner.pubkey()).await?;

    let underlying_token_account =
        create_token_account(context, &vault.underlying_mint, &owner.pubkey()).await?;
    let share_token_account =
        create_token_account(context, &vault.share_mint, &owner.pubkey()).await?;

    let (depositor_record, _) =
        derive_depositor_record_pda(&program_id, &vault.vault, &owner.pubkey());

    let accounts = yield_vault::accounts::SetDepositor {
        vault: vault.vault,
        protocol_state: protocol.protocol_state,
        depositor_record,
        owner: protocol.owner,
        system_program: solana_sdk::system_program::ID,
    };

    let ix = Instruction {
        program_id,
        accounts: accounts.to_account_metas(None),
        data: yield_vault::instruction::SetDepositor {
            depositor: owner.pubkey(),
            authorized: true,
        }
        .data(),
    };

    send(context, &[ix], &protocol.owner_keypair, &[]).await?;

    Ok(UserAccounts {
        owner,
        underlying_token_account,
        share_token_account,
        depositor_record,
    })
}

pub async fn mint_tokens_to(
    context: &mut ProgramTestContext,
    mint: &Pubkey,
    mint_authority: &Keypair,
    destination: &Pubkey,
    amount: u64,
) -> FuzzResult<()> {
    let mint_to_ix = token_instruction::mint_to(
        &spl_token::id(),
        mint,
        destination,
        &mint_authority.pubkey(),
        &[],
        amount,
    )?;

    let payer = context.payer.insecure_clone();
    send(context, &[mint_to_ix], &payer, &[mint_authority]).await
}

/// Yield: liquidity lands in the reserve without minting reserve shares
pub async fn donate_to_reserve(
    context: &mut ProgramTestContext,
    underlying: &UnderlyingMintAccounts,
    reserve: &ReserveAccounts,
    amount: u64,
) -> FuzzResult<()> {
    mint_tokens_to(
        context,
        &underlying.mint,
        &underlying.mint_authority,
        &reserve.liquidity_account,
        amount,
    )
    .await
}

/// Loss: the reserve authority pulls liquidity out without burning shares
pub async fn slash_reserve(
    env: &mut FuzzTestEnv,
    underlying: &UnderlyingMintAccounts,
    reserve: &ReserveAccounts,
    amount: u64,
) -> FuzzResult<()> {
    let accounts = lending_market::accounts::Slash {
        reserve: reserve.reserve,
        liquidity_mint: underlying.mint,
        liquidity_account: reserve.liquidity_account,
        destination: reserve.sink,
        authority: reserve.authority.pubkey(),
        token_program: spl_token::id(),
    };

    let ix = Instruction {
        program_id: env.lending_program_id,
        accounts: accounts.to_account_metas(None),
        data: lending_market::instruction::Slash { amount }.data(),
    };

    send(&mut env.context, &[ix], &reserve.authority, &[]).await
}

/// Protocol, mint, reserve, seeded vault and a funded, authorized user.
pub async fn setup_complete_environment(
    initial_user_balance: u64,
    decimals: u8,
    seed_assets: u64,
    fee_rate_bps: u16,
) -> FuzzResult<(FuzzTestEnv, CompleteSetup)> {
    let mut env = setup_program_test().await;

    let protocol = setup_protocol(&mut env.context, &env.program_id).await?;
    let underlying = setup_underlying_mint(&mut env.context, decimals).await?;
    let reserve = setup_reserve(
        &mut env.context,
        &env.lending_program_id,
        &underlying,
        u64::MAX,
    )
    .await?;
    let vault = setup_vault(
        &mut env,
        &protocol,
        &underlying,
        &reserve,
        seed_assets,
        fee_rate_bps,
    )
    .await?;
    let user = setup_user_accounts(&mut env, &protocol, &vault).await?;

    if initial_user_balance > 0 {
        mint_tokens_to(
            &mut env.context,
            &underlying.mint,
            &underlying.mint_authority,
            &user.underlying_token_account,
            initial_user_balance,
        )
        .await?;
    }

    let setup = CompleteSetup {
        protocol,
        underlying,
        reserve,
        vault,
        user,
    };

    Ok((env, setup))
}

// ============================================================================
// Instruction Builders
// ============================================================================

fn deposit_accounts(
    env: &FuzzTestEnv,
    setup: &CompleteSetup,
    share_account: Pubkey,
) -> Vec<AccountMeta> {
    yield_vault::accounts::Deposit {
        vault: setup.vault.vault,
        protocol_state: setup.protocol.protocol_state,
        depositor_record: Some(setup.user.depositor_record),
        underlying_mint: setup.underlying.mint,
        vault_token_account: setup.vault.vault_token_account,
        share_mint: setup.vault.share_mint,
        vault_authority: setup.protocol.vault_authority,
        reserve: setup.reserve.reserve,
        liquidity_account: setup.reserve.liquidity_account,
        position: setup.vault.position,
        depositor_underlying_account: setup.user.underlying_token_account,
        depositor_share_account: share_account,
        depositor: setup.user.owner.pubkey(),
        lending_program: env.lending_program_id,
        token_program: spl_token::id(),
    }
    .to_account_metas(None)
}

pub fn deposit_ix(env: &FuzzTestEnv, setup: &CompleteSetup, assets: u64) -> Instruction {
    deposit_ix_into(env, setup, assets, setup.user.share_token_account)
}

/// Deposit by the setup user whose shares land in `share_account`
pub fn deposit_ix_into(
    env: &FuzzTestEnv,
    setup: &CompleteSetup,
    assets: u64,
    share_account: Pubkey,
) -> Instruction {
    Instruction {
        program_id: env.program_id,
        accounts: deposit_accounts(env, setup, share_account),
        data: yield_vault::instruction::Deposit { assets }.data(),
    }
}

pub fn mint_ix(env: &FuzzTestEnv, setup: &CompleteSetup, shares: u64) -> Instruction {
    Instruction {
        program_id: env.program_id,
        accounts: deposit_accounts(env, setup, setup.user.share_token_account),
        data: yield_vault::instruction::Mint { shares }.data(),
    }
}

pub fn set_fee_rate_ix(env: &FuzzTestEnv, setup: &CompleteSetup, fee_rate_bps: u16) -> Instruction {
    let accounts = yield_vault::accounts::SetFeeRate {
        vault: setup.vault.vault,
        protocol_state: setup.protocol.protocol_state,
        reserve: setup.reserve.reserve,
        liquidity_account: setup.reserve.liquidity_account,
        position: setup.vault.position,
        caller: setup.protocol.owner,
    };

    Instruction {
        program_id: env.program_id,
        accounts: accounts.to_account_metas(None),
        data: yield_vault::instruction::SetFeeRate { fee_rate_bps }.data(),
    }
}

pub fn collect_fees_ix(env: &FuzzTestEnv, setup: &CompleteSetup) -> Instruction {
    let accounts = yield_vault::accounts::CollectFees {
        vault: setup.vault.vault,
        protocol_state: setup.protocol.protocol_state,
        underlying_mint: setup.underlying.mint,
        vault_token_account: setup.vault.vault_token_account,
        vault_authority: setup.protocol.vault_authority,
        reserve: setup.reserve.reserve,
        liquidity_account: setup.reserve.liquidity_account,
        position: setup.vault.position,
        treasury: setup.vault.treasury,
        caller: setup.protocol.owner,
        lending_program: env.lending_program_id,
        token_program: spl_token::id(),
    };

    Instruction {
        program_id: env.program_id,
        accounts: accounts.to_account_metas(None),
        data: yield_vault::instruction::CollectFees {}.data(),
    }
}

pub fn redeem_ix(env: &FuzzTestEnv, setup: &CompleteSetup, shares: u64) -> Instruction {
    let accounts = yield_vault::accounts::Withdraw {
        vault: setup.vault.vault,
        underlying_mint: setup.underlying.mint,
        vault_token_account: setup.vault.vault_token_account,
        share_mint: setup.vault.share_mint,
        vault_authority: setup.protocol.vault_authority,
        reserve: setup.reserve.reserve,
        liquidity_account: setup.reserve.liquidity_account,
        position: setup.vault.position,
        receiver: setup.user.underlying_token_account,
        owner_share_account: setup.user.share_token_account,
        owner: setup.user.owner.pubkey(),
        lending_program: env.lending_program_id,
        token_program: spl_token::id(),
    };

    Instruction {
        program_id: env.program_id,
        accounts: accounts.to_account_metas(None),
        data: yield_vault::instruction::Redeem { shares }.data(),
    }
}

pub async fn send_as_owner(
    env: &mut FuzzTestEnv,
    setup: &CompleteSetup,
    ix: Instruction,
) -> FuzzResult<()> {
    let budget_ix = ComputeBudgetInstruction::set_compute_unit_limit(400_000);
    send(
        &mut env.context,
        &[budget_ix, ix],
        &setup.protocol.owner_keypair,
        &[],
    )
    .await
}

pub async fn send_as_user(
    env: &mut FuzzTestEnv,
    setup: &CompleteSetup,
    ix: Instruction,
) -> FuzzResult<()> {
    let budget_ix = ComputeBudgetInstruction::set_compute_unit_limit(400_000);
    send(&mut env.context, &[budget_ix, ix], &setup.user.owner, &[]).await
}

// ============================================================================
// PDA Derivation Helpers
// ============================================================================

pub fn derive_protocol_state_pda(program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[yield_vault::PROTOCOL_STATE_SEED], program_id)
}

pub fn derive_vault_authority_pda(program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[yield_vault::VAULT_AUTHORITY_SEED], program_id)
}

pub fn derive_vault_pda(program_id: &Pubkey, underlying_mint: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[yield_vault::VAULT_SEED, underlying_mint.as_ref()],
        program_id,
    )
}

pub fn derive_share_mint_pda(program_id: &Pubkey, vault: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[yield_vault::SHARE_MINT_SEED, vault.as_ref()], program_id)
}

pub fn derive_vault_token_account_pda(program_id: &Pubkey, vault: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[yield_vault::VAULT_TOKEN_ACCOUNT_SEED, vault.as_ref()],
        program_id,
    )
}

pub fn derive_seed_shares_pda(program_id: &Pubkey, vault: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[yield_vault::SEED_SHARES_SEED, vault.as_ref()], program_id)
}

pub fn derive_depositor_record_pda(
    program_id: &Pubkey,
    vault: &Pubkey,
    depositor: &Pubkey,
) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[yield_vault::DEPOSITOR_SEED, vault.as_ref(), depositor.as_ref()],
        program_id,
    )
}

pub fn derive_reserve_pda(lending_program_id: &Pubkey, mint: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[lending_market::RESERVE_SEED, mint.as_ref()],
        lending_program_id,
    )
}

pub fn derive_liquidity_pda(lending_program_id: &Pubkey, reserve: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[lending_market::LIQUIDITY_SEED, reserve.as_ref()],
        lending_program_id,
    )
}

pub fn derive_position_pda(
    lending_program_id: &Pubkey,
    reserve: &Pubkey,
    owner: &Pubkey,
) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[lending_market::POSITION_SEED, reserve.as_ref(), owner.as_ref()],
        lending_program_id,
    )
}

// ============================================================================
// Account State Helpers
// ============================================================================

async fn fetch<T: AccountDeserialize>(
    context: &mut ProgramTestContext,
    address: &Pubkey,
) -> FuzzResult<T> {
    let account = context
        .banks_client
        .get_account(*address)
        .await?
        .ok_or("account not found")?;

    Ok(T::try_deserialize(&mut account.data.as_ref())?)
}

pub async fn get_vault_state(context: &mut ProgramTestContext, vault: &Pubkey) -> FuzzResult<Vault> {
    fetch(context, vault).await
}

/// Reads a little-endian u64 at `offset` of an SPL account
async fn read_u64(
    context: &mut ProgramTestContext,
    address: &Pubkey,
    offset: usize,
) -> FuzzResult<u64> {
    let account = context
        .banks_client
        .get_account(*address)
        .await?
        .ok_or("account not found")?;

    let bytes = account
        .data
        .get(offset..offset + 8)
        .ok_or("account data too short")?;

    Ok(u64::from_le_bytes(bytes.try_into()?))
}

/// Token account `amount` sits at offset 64
pub async fn get_token_balance(context: &mut ProgramTestContext, account: &Pubkey) -> FuzzResult<u64> {
    read_u64(context, account, 64).await
}

/// Mint `supply` sits at offset 36
pub async fn get_mint_supply(context: &mut ProgramTestContext, mint: &Pubkey) -> FuzzResult<u64> {
    read_u64(context, mint, 36).await
}

/// What the vault's lending position would pay out right now
pub async fn get_position_balance(
    context: &mut ProgramTestContext,
    reserve: &ReserveAccounts,
    vault: &VaultAccounts,
) -> FuzzResult<u64> {
    let reserve_state: Reserve = fetch(context, &reserve.reserve).await?;
    let position: Position = fetch(context, &vault.position).await?;
    let liquidity = get_token_balance(context, &reserve.liquidity_account).await?;

    Ok(reserve_state.balance_of(position.shares, liquidity)?)
}
