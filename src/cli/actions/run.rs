use crate::api::{ApiClient, Outcome};
use crate::auth::guard::ActionGuard;
use crate::auth::step_up::{NoBiometrics, PinSource};
use crate::cli::actions::Action;
use crate::cli::globals::GlobalArgs;
use crate::ops::{self, account, bills, cards, deposit, profile, tickets, token_transfer, transfer};
use crate::session::SessionStore;
use anyhow::Result;
use std::io::Write;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Prompts for the PIN on standard input.
struct StdinPin;

impl PinSource for StdinPin {
    async fn read_pin(&self) -> Result<String> {
        eprint!("Enter PIN: ");
        std::io::stderr().flush()?;
        let mut line = String::new();
        BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
        Ok(line)
    }
}

/// Render the terminal outcome screen.
fn render_outcome(outcome: &Outcome) {
    match outcome {
        Outcome::Success { message } => println!("success: {message}"),
        Outcome::Pending { message } => println!("pending: {message}"),
        Outcome::Failed { message } => println!("failed: {message}"),
    }
}

/// A failed step-up is recoverable: show the reason and leave the user on
/// their screen. Everything else propagates as a blocking error.
fn render(result: Result<Outcome, ops::OpError>) -> Result<()> {
    match result {
        Ok(outcome) => {
            render_outcome(&outcome);
            Ok(())
        }
        Err(ops::OpError::StepUp(reason)) => {
            println!("failed: {reason}");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

/// Execute the provided action.
// This is the single dispatch point for all CLI actions.
/// # Errors
/// Returns an error if the action fails.
#[allow(clippy::too_many_lines)]
pub async fn execute(action: Action, globals: &GlobalArgs) -> Result<()> {
    let store = SessionStore::open(&globals.data_dir)?;
    let client = ApiClient::new(&globals.api_url, Duration::from_secs(globals.timeout_secs))?;
    let guard = ActionGuard::new();
    let pin_source = StdinPin;
    let biometric = NoBiometrics;
    let gw = ops::Gateway {
        store: &store,
        client: &client,
        guard: &guard,
        pin_source: &pin_source,
        biometric: &biometric,
    };

    match action {
        Action::Login {
            email,
            password,
            remember_biometrics,
        } => {
            let record = account::login(&store, &client, &email, &password, remember_biometrics).await?;
            println!("logged in as {} ({})", record.user_id, email);
        }
        Action::BiometricLogin => {
            let record = account::biometric_login(&store, &client, &biometric).await?;
            println!("logged in as {}", record.user_id);
        }
        Action::Logout { forget_biometrics } => {
            account::logout(&store, forget_biometrics)?;
            println!("logged out");
        }
        Action::Register {
            email,
            password,
            phone,
            first_name,
            last_name,
        } => {
            let record = account::register(
                &store,
                &client,
                &email,
                &password,
                &phone,
                &first_name,
                &last_name,
            )
            .await?;
            println!("registered as {}", record.user_id);
        }
        Action::Wallets => {
            for wallet in account::wallets(&store, &client).await? {
                println!("{} {}", wallet.currency, wallet.balance);
            }
        }
        Action::Transactions => {
            for tx in account::transactions(&store, &client).await? {
                println!(
                    "{} {} {} {} [{}]",
                    tx.reference, tx.kind, tx.amount, tx.currency, tx.status
                );
            }
        }
        Action::Send {
            amount,
            currency,
            to,
            narration,
        } => {
            let form = transfer::SendMoneyForm {
                amount,
                currency,
                recipient_account: to,
                narration,
            };
            render(transfer::send_money(&gw, &form).await.map(|r| r.outcome))?;
        }
        Action::Payout {
            amount,
            currency,
            bank,
            account,
            name,
        } => {
            let form = transfer::PayoutForm {
                amount,
                currency,
                bank_code: bank,
                account_number: account,
                account_name: name,
            };
            render(transfer::payout(&gw, &form).await.map(|r| r.outcome))?;
        }
        Action::FxPayout {
            amount,
            from_currency,
            to_currency,
            rate,
            bank,
            account,
        } => {
            let form = transfer::FxPayoutForm {
                amount,
                source_currency: from_currency,
                target_currency: to_currency,
                quoted_rate: rate,
                bank_code: bank,
                account_number: account,
            };
            render(transfer::fx_payout(&gw, &form).await.map(|r| r.outcome))?;
        }
        Action::BillPay {
            biller,
            reference,
            amount,
            currency,
        } => {
            let form = bills::BillPayForm {
                biller_code: biller,
                customer_reference: reference,
                amount,
                currency,
            };
            render(bills::pay_bill(&gw, &form).await.map(|r| r.outcome))?;
        }
        Action::Airtime {
            phone,
            amount,
            currency,
        } => {
            let form = bills::AirtimeForm {
                phone,
                amount,
                currency,
            };
            render(bills::buy_airtime(&gw, &form).await.map(|r| r.outcome))?;
        }
        Action::CardList => {
            for card in cards::list(&gw).await? {
                println!(
                    "{} {} {} [{}]",
                    card.id, card.masked_pan, card.currency, card.status
                );
            }
        }
        Action::CardCreate { currency } => {
            render(cards::create(&gw, &currency).await.map(|r| r.outcome))?;
        }
        Action::CardFund { card, amount } => {
            render(cards::fund(&gw, &card, &amount).await.map(|r| r.outcome))?;
        }
        Action::CardFreeze { card, frozen } => {
            render(cards::freeze(&gw, &card, frozen).await.map(|r| r.outcome))?;
        }
        Action::Deposit {
            amount,
            currency,
            provider,
        } => {
            let form = deposit::DepositForm {
                amount,
                currency,
                provider,
            };
            match deposit::create(&gw, &form).await {
                Ok(receipt) => {
                    render_outcome(&receipt.outcome);
                    if let Some(init) = receipt.init {
                        if let Some(url) = init.checkout_url {
                            println!("complete the deposit at: {url}");
                        }
                        println!("reference: {}", init.reference);
                    }
                }
                Err(ops::OpError::StepUp(reason)) => println!("failed: {reason}"),
                Err(err) => return Err(err.into()),
            }
        }
        Action::TokenSend {
            amount,
            currency,
            name,
            phone,
        } => {
            let form = token_transfer::TokenTransferForm {
                amount,
                currency,
                recipient_name: name,
                recipient_phone: phone,
            };
            match token_transfer::create(&gw, &form).await {
                Ok(receipt) => {
                    render_outcome(&receipt.outcome);
                    if let Some(init) = receipt.init {
                        println!("control number: {}", init.control_number);
                    }
                }
                Err(ops::OpError::StepUp(reason)) => println!("failed: {reason}"),
                Err(err) => return Err(err.into()),
            }
        }
        Action::TokenRedeem { code } => {
            render(token_transfer::redeem(&gw, &code).await)?;
        }
        Action::TicketList => {
            for ticket in tickets::list(&store, &client).await? {
                println!("{} {} [{}]", ticket.id, ticket.subject, ticket.status);
            }
        }
        Action::TicketOpen { subject, message } => {
            render(tickets::open(&store, &client, &subject, &message).await)?;
        }
        Action::TicketReply { ticket, message } => {
            render(tickets::reply(&store, &client, &ticket, &message).await)?;
        }
        Action::ChangePin { new_pin } => {
            render(profile::change_pin(&gw, &new_pin).await)?;
        }
        Action::ChangePassword { current, new } => {
            render(profile::change_password(&gw, &current, &new).await)?;
        }
        Action::ChangePhone { phone } => {
            render(profile::change_phone(&gw, &phone).await)?;
        }
    }

    Ok(())
}
