#![no_main]

use anchor_lang::prelude::*;
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use yield_vault::accounting::{
    self, AccessControl, AccrualLedger, PositionCustody, PositionOracle, ShareRegistry,
    VaultTotals,
};

const HOLDERS: usize = 3;

/// Position whose balance moves only when the fuzzer says so
#[derive(Clone, Debug, Default)]
struct Position {
    balance: u64,
    liquidity: u64,
    supply_cap: u64,
}

impl PositionOracle for Position {
    fn live_balance(&self) -> Result<u64> {
        Ok(self.balance)
    }

    fn max_supply(&self) -> Result<u64> {
        Ok(self.supply_cap.saturating_sub(self.balance))
    }

    fn available_liquidity(&self) -> Result<u64> {
        Ok(self.liquidity.min(self.balance))
    }
}

impl PositionCustody for Position {
    fn supply(&mut self, amount: u64) -> Result<()> {
        self.balance = self.balance.checked_add(amount).ok_or(ProgramError::ArithmeticOverflow)?;
        self.liquidity = self.liquidity.saturating_add(amount);
        Ok(())
    }

    fn withdraw(&mut self, amount: u64) -> Result<u64> {
        if amount > self.available_liquidity()? {
            return Err(ProgramError::InsufficientFunds.into());
        }
        self.balance -= amount;
        self.liquidity -= amount;
        Ok(amount)
    }
}

/// Share book of every holder; `active` picks the one an operation acts on
#[derive(Clone, Debug, Default)]
struct Book {
    balances: [u64; HOLDERS],
    seed: u64,
    active: usize,
}

impl Book {
    fn supply(&self) -> u64 {
        self.seed + self.balances.iter().sum::<u64>()
    }
}

impl ShareRegistry for Book {
    fn total_shares(&self) -> Result<u64> {
        Ok(self.supply())
    }

    fn balance(&self) -> Result<u64> {
        Ok(self.balances[self.active])
    }

    fn mint(&mut self, shares: u64) -> Result<()> {
        self.supply()
            .checked_add(shares)
            .ok_or(ProgramError::ArithmeticOverflow)?;
        self.balances[self.active] += shares;
        Ok(())
    }

    fn burn(&mut self, shares: u64) -> Result<()> {
        self.balances[self.active] -= shares;
        Ok(())
    }
}

struct Open;

impl AccessControl for Open {
    fn is_authorized_depositor(&self, _: &Pubkey) -> bool {
        true
    }

    fn is_fee_administrator(&self, _: &Pubkey) -> bool {
        true
    }
}

#[derive(Debug, Clone, Arbitrary)]
enum Op {
    Yield(u32),
    Loss(u32),
    Freeze(u32),
    Deposit { holder: u8, assets: u32 },
    Mint { holder: u8, shares: u32 },
    Withdraw { holder: u8, assets: u32 },
    Redeem { holder: u8, shares: u32 },
    SetRate(u16),
    Collect,
}

#[derive(Debug, Clone, Arbitrary)]
struct AccrualFuzzInput {
    seed_assets: u32,
    fee_rate_bps: u16,
    ops: Vec<Op>,
}

#[derive(Clone)]
struct Model {
    ledger: AccrualLedger,
    position: Position,
    book: Book,
}

impl Model {
    fn apply(&mut self, op: &Op) -> Result<()> {
        let who = Pubkey::default();
        match *op {
            Op::Yield(amount) => {
                self.position.balance = self.position.balance.saturating_add(amount as u64);
                self.position.liquidity = self.position.liquidity.saturating_add(amount as u64);
            }
            Op::Loss(amount) => {
                let loss = (amount as u64).min(self.position.balance);
                self.position.balance -= loss;
                self.position.liquidity = self.position.liquidity.min(self.position.balance);
            }
            Op::Freeze(liquidity) => {
                self.position.liquidity = liquidity as u64;
            }
            Op::Deposit { holder, assets } => {
                self.book.active = holder as usize % HOLDERS;
                accounting::deposit(
                    &mut self.ledger,
                    &mut self.position,
                    &mut self.book,
                    &Open,
                    &who,
                    assets as u64,
                )?;
            }
            Op::Mint { holder, shares } => {
                self.book.active = holder as usize % HOLDERS;
                accounting::mint(
                    &mut self.ledger,
                    &mut self.position,
                    &mut self.book,
                    &Open,
                    &who,
                    shares as u64,
                )?;
            }
            Op::Withdraw { holder, assets } => {
                self.book.active = holder as usize % HOLDERS;
                accounting::withdraw(
                    &mut self.ledger,
                    &mut self.position,
                    &mut self.book,
                    assets as u64,
                )?;
            }
            Op::Redeem { holder, shares } => {
                self.book.active = holder as usize % HOLDERS;
                accounting::redeem(
                    &mut self.ledger,
                    &mut self.position,
                    &mut self.book,
                    shares as u64,
                )?;
            }
            Op::SetRate(rate) => {
                accounting::set_fee_rate(&mut self.ledger, &self.position, &Open, &who, rate)?;
            }
            Op::Collect => {
                let sweep =
                    accounting::collect_fees(&mut self.ledger, &mut self.position, &Open, &who)?;
                assert!(sweep.amount > 0);
            }
        }
        Ok(())
    }

    fn check(&self, op: &Op) {
        let live = self.position.balance;

        // Fees never exceed the position and the split accounts for all of it
        let fees = self.ledger.live_fees(live).unwrap();
        assert!(fees <= live, "fees {} exceed live balance {} after {:?}", fees, live, op);
        assert_eq!(
            self.ledger.live_total_assets(live).unwrap() + fees,
            live,
            "split does not sum to the position after {:?}",
            op
        );

        // A settled ledger stays settled
        let mut once = self.ledger;
        once.resynchronize(live).unwrap();
        let settled = once;
        assert_eq!(once.resynchronize(live).unwrap(), None);
        assert_eq!(once, settled);

        // Converting to shares and back never manufactures value
        let totals = VaultTotals::observe(&self.ledger, &self.position, self.book.supply()).unwrap();
        for assets in [1, 999, totals.total_assets, live] {
            if let Ok(shares) = totals.preview_deposit(assets) {
                assert!(totals.preview_redeem(shares).unwrap() <= assets);
            }
        }

        // Holders can never claim more than depositors own
        let claimed: u64 = self
            .book
            .balances
            .iter()
            .map(|&shares| totals.preview_redeem(shares).unwrap())
            .sum();
        assert!(
            claimed <= totals.total_assets,
            "holders claim {} of {} after {:?}",
            claimed,
            totals.total_assets,
            op
        );
    }
}

fuzz_target!(|input: AccrualFuzzInput| {
    let seed_assets = (input.seed_assets as u64).max(1);
    let fee_rate_bps = input.fee_rate_bps % 10_001;

    let mut position = Position {
        supply_cap: u64::MAX / 2,
        ..Default::default()
    };
    let mut seed_book = Book::default();
    let (ledger, minted) =
        match accounting::seed(&mut position, &mut seed_book, seed_assets, fee_rate_bps) {
            Ok(result) => result,
            Err(_) => return,
        };

    let mut model = Model {
        ledger,
        position,
        book: Book {
            seed: minted,
            ..Default::default()
        },
    };

    for op in input.ops.iter().take(64) {
        // A failed operation reverts as a whole, the way a transaction does
        let before = model.clone();
        let ledger_before = model.ledger;
        if model.apply(op).is_err() {
            model = before;
            continue;
        }

        if matches!(
            op,
            Op::Deposit { .. } | Op::Mint { .. } | Op::Withdraw { .. } | Op::Redeem { .. } | Op::Collect
        ) {
            assert_eq!(
                model.ledger.checkpoint_balance, model.position.balance,
                "checkpoint not restamped after {:?}",
                op
            );
        }
        if let Op::SetRate(_) = op {
            // Accrual up to now was priced at the old rate
            assert_eq!(
                model.ledger.accumulated_fees,
                ledger_before.live_fees(model.position.balance).unwrap()
            );
        }

        model.check(op);
    }

    // Everyone can leave once the pool is liquid again
    model.position.liquidity = model.position.balance;
    for holder in 0..HOLDERS {
        let shares = model.book.balances[holder];
        if shares == 0 {
            continue;
        }
        let op = Op::Redeem {
            holder: holder as u8,
            shares: 0,
        };
        model.book.active = holder;
        let before = model.clone();
        if accounting::redeem(&mut model.ledger, &mut model.position, &mut model.book, shares)
            .is_err()
        {
            model = before;
        }
        model.check(&op);
    }
    assert!(model.ledger.accumulated_fees <= model.ledger.checkpoint_balance);
});
