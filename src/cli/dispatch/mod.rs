//! Map validated CLI matches to an action plus the shared globals.

use crate::cli::actions::Action;
use crate::cli::commands::{ARG_API_URL, ARG_DATA_DIR, ARG_TIMEOUT};
use crate::cli::globals::GlobalArgs;
use anyhow::{anyhow, Context, Result};
use secrecy::SecretString;
use std::path::PathBuf;

fn required(matches: &clap::ArgMatches, name: &str) -> Result<String> {
    matches
        .get_one::<String>(name)
        .cloned()
        .with_context(|| format!("missing required argument: --{name}"))
}

fn optional(matches: &clap::ArgMatches, name: &str) -> Option<String> {
    matches.get_one::<String>(name).cloned()
}

fn secret(matches: &clap::ArgMatches, name: &str) -> Result<SecretString> {
    required(matches, name).map(SecretString::from)
}

fn default_data_dir() -> Result<PathBuf> {
    std::env::var_os("HOME")
        .map(|home| PathBuf::from(home).join(".tumapay"))
        .ok_or_else(|| anyhow!("cannot determine data dir: HOME is not set, pass --data-dir"))
}

/// Build the globals and the action out of parsed matches.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<(Action, GlobalArgs)> {
    let api_url = required(matches, ARG_API_URL)?;
    let data_dir = match matches.get_one::<String>(ARG_DATA_DIR) {
        Some(dir) => PathBuf::from(dir),
        None => default_data_dir()?,
    };
    let timeout_secs = matches.get_one::<u64>(ARG_TIMEOUT).copied().unwrap_or(30);
    let globals = GlobalArgs::new(api_url, data_dir, timeout_secs);

    let (name, sub) = matches
        .subcommand()
        .ok_or_else(|| anyhow!("a subcommand is required"))?;

    let action = match name {
        "login" => Action::Login {
            email: required(sub, "email")?,
            password: secret(sub, "password")?,
            remember_biometrics: sub.get_flag("remember-biometrics"),
        },
        "biometric-login" => Action::BiometricLogin,
        "logout" => Action::Logout {
            forget_biometrics: sub.get_flag("forget-biometrics"),
        },
        "register" => Action::Register {
            email: required(sub, "email")?,
            password: secret(sub, "password")?,
            phone: required(sub, "phone")?,
            first_name: required(sub, "first-name")?,
            last_name: required(sub, "last-name")?,
        },
        "wallets" => Action::Wallets,
        "transactions" => Action::Transactions,
        "send" => Action::Send {
            amount: required(sub, "amount")?,
            currency: required(sub, "currency")?,
            to: required(sub, "to")?,
            narration: optional(sub, "narration"),
        },
        "payout" => Action::Payout {
            amount: required(sub, "amount")?,
            currency: required(sub, "currency")?,
            bank: required(sub, "bank")?,
            account: required(sub, "account")?,
            name: optional(sub, "name"),
        },
        "fx-payout" => Action::FxPayout {
            amount: required(sub, "amount")?,
            from_currency: required(sub, "from-currency")?,
            to_currency: required(sub, "to-currency")?,
            rate: required(sub, "rate")?,
            bank: required(sub, "bank")?,
            account: required(sub, "account")?,
        },
        "billpay" => Action::BillPay {
            biller: required(sub, "biller")?,
            reference: required(sub, "reference")?,
            amount: required(sub, "amount")?,
            currency: required(sub, "currency")?,
        },
        "airtime" => Action::Airtime {
            phone: required(sub, "phone")?,
            amount: required(sub, "amount")?,
            currency: required(sub, "currency")?,
        },
        "cards" => match sub.subcommand() {
            Some(("list", _)) => Action::CardList,
            Some(("create", sub)) => Action::CardCreate {
                currency: required(sub, "currency")?,
            },
            Some(("fund", sub)) => Action::CardFund {
                card: required(sub, "card")?,
                amount: required(sub, "amount")?,
            },
            Some(("freeze", sub)) => Action::CardFreeze {
                card: required(sub, "card")?,
                frozen: !sub.get_flag("unfreeze"),
            },
            _ => return Err(anyhow!("unknown cards subcommand")),
        },
        "deposit" => Action::Deposit {
            amount: required(sub, "amount")?,
            currency: required(sub, "currency")?,
            provider: required(sub, "provider")?,
        },
        "token-send" => Action::TokenSend {
            amount: required(sub, "amount")?,
            currency: required(sub, "currency")?,
            name: required(sub, "name")?,
            phone: required(sub, "phone")?,
        },
        "token-redeem" => Action::TokenRedeem {
            code: required(sub, "code")?,
        },
        "tickets" => match sub.subcommand() {
            Some(("list", _)) => Action::TicketList,
            Some(("open", sub)) => Action::TicketOpen {
                subject: required(sub, "subject")?,
                message: required(sub, "message")?,
            },
            Some(("reply", sub)) => Action::TicketReply {
                ticket: required(sub, "ticket")?,
                message: required(sub, "message")?,
            },
            _ => return Err(anyhow!("unknown tickets subcommand")),
        },
        "change-pin" => Action::ChangePin {
            new_pin: required(sub, "new-pin")?,
        },
        "change-password" => Action::ChangePassword {
            current: secret(sub, "current")?,
            new: secret(sub, "new")?,
        },
        "change-phone" => Action::ChangePhone {
            phone: required(sub, "phone")?,
        },
        other => return Err(anyhow!("unknown subcommand: {other}")),
    };

    Ok((action, globals))
}
