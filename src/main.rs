use color_eyre::eyre::OptionExt as _;
use csv::ReaderBuilder;
use csv::Trim;

use toypacts::engine::PactEngine;
use toypacts::event::PactEvent;
use toypacts::ledger::AccountingLedger;
use toypacts::operation::Operation;
use toypacts::report;

const DEFAULT_TIMEOUT_TICKS: u64 = 100;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let ops_file_path = std::env::args().nth(1).ok_or_eyre("no operations CSV supplied")?;
    let timeout = match std::env::args().nth(2) {
        Some(raw) => raw.parse()?,
        None => DEFAULT_TIMEOUT_TICKS,
    };

    let mut ops_file_reader = ReaderBuilder::new().trim(Trim::All).from_path(ops_file_path)?;

    let mut ledger = AccountingLedger::new();
    let mut pact_engine = PactEngine::new(timeout);
    let mut any_rejected = false;

    for op_res in ops_file_reader.deserialize::<Operation>() {
        let Ok(op) = op_res else {
            eprintln!("failed to deserialize operation, error={op_res:?}");
            any_rejected = true;
            continue;
        };

        match apply_operation(&mut pact_engine, &mut ledger, op.clone()) {
            Ok(Some(event)) => eprintln!("{event}"),
            Ok(None) => {}
            Err(error) => {
                eprintln!("error handling operation, op={op:?}, error={error:?}");
                any_rejected = true;
            }
        }
    }

    report::write_csv_to_stdout(&ledger)?;

    if any_rejected {
        std::process::exit(1);
    }
    Ok(())
}

/// Routes ledger entry points (withdraw, donate) straight to the ledger and
/// everything else through the engine: withdrawal stays out of the state
/// machine's reach.
fn apply_operation(
    pact_engine: &mut PactEngine,
    ledger: &mut AccountingLedger,
    op: Operation,
) -> color_eyre::Result<Option<PactEvent>> {
    let event = match op {
        Operation::Propose(propose) => Some(pact_engine.propose(propose)?),
        Operation::Cancel(cancel) => Some(pact_engine.cancel(ledger, cancel)?),
        Operation::Seal(seal) => Some(pact_engine.seal(seal)?),
        Operation::CommitAnswer1(commit) => Some(pact_engine.commit_answer1(commit)?),
        Operation::SubmitAnswer2(answer) => Some(pact_engine.submit_answer2(answer)?),
        Operation::RevealAnswer1(reveal) => Some(pact_engine.reveal_answer1(ledger, reveal)?),
        Operation::Timeout(claim) => Some(pact_engine.claim_timeout(ledger, claim)?),
        Operation::Withdraw(withdraw) => {
            let amount = ledger.withdraw(withdraw.caller)?;
            eprintln!("withdrawn account={} amount={amount}", withdraw.caller);
            None
        }
        Operation::Donate(donate) => {
            let donation = ledger.accept_deposit(donate.caller, donate.value);
            eprintln!("accepted {donation}");
            None
        }
    };
    Ok(event)
}
