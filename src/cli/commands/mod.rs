pub mod logging;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ArgAction, ColorChoice, Command,
};

pub const ARG_API_URL: &str = "api-url";
pub const ARG_DATA_DIR: &str = "data-dir";
pub const ARG_TIMEOUT: &str = "timeout";

fn amount_arg() -> Arg {
    Arg::new("amount")
        .long("amount")
        .help("Amount, positive decimal with up to two fraction digits")
        .required(true)
}

fn currency_arg() -> Arg {
    Arg::new("currency")
        .long("currency")
        .help("Wallet currency code, e.g. KES")
        .required(true)
}

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("tumapay")
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new(ARG_API_URL)
                .long(ARG_API_URL)
                .help("Base URL of the banking API")
                .default_value("https://api.tumapay.dev")
                .env("TUMAPAY_API_URL")
                .global(true),
        )
        .arg(
            Arg::new(ARG_DATA_DIR)
                .long(ARG_DATA_DIR)
                .help("Directory for local session state (default: ~/.tumapay)")
                .env("TUMAPAY_DATA_DIR")
                .global(true),
        )
        .arg(
            Arg::new(ARG_TIMEOUT)
                .long(ARG_TIMEOUT)
                .help("Per-request timeout in seconds")
                .default_value("30")
                .env("TUMAPAY_TIMEOUT")
                .value_parser(clap::value_parser!(u64))
                .global(true),
        )
        .subcommand(
            Command::new("login")
                .about("Authenticate and persist the session")
                .arg(
                    Arg::new("email")
                        .long("email")
                        .required(true)
                        .help("Account email"),
                )
                .arg(
                    Arg::new("password")
                        .long("password")
                        .env("TUMAPAY_PASSWORD")
                        .required(true)
                        .help("Account password"),
                )
                .arg(
                    Arg::new("remember-biometrics")
                        .long("remember-biometrics")
                        .action(ArgAction::SetTrue)
                        .help("Cache credentials for biometric re-login"),
                ),
        )
        .subcommand(
            Command::new("biometric-login")
                .about("Re-login with cached credentials after a biometric match"),
        )
        .subcommand(
            Command::new("logout")
                .about("Clear the local session")
                .arg(
                    Arg::new("forget-biometrics")
                        .long("forget-biometrics")
                        .action(ArgAction::SetTrue)
                        .help("Also forget cached biometric credentials"),
                ),
        )
        .subcommand(
            Command::new("register")
                .about("Create an account")
                .arg(Arg::new("email").long("email").required(true))
                .arg(
                    Arg::new("password")
                        .long("password")
                        .env("TUMAPAY_PASSWORD")
                        .required(true),
                )
                .arg(Arg::new("phone").long("phone").required(true))
                .arg(Arg::new("first-name").long("first-name").required(true))
                .arg(Arg::new("last-name").long("last-name").required(true)),
        )
        .subcommand(Command::new("wallets").about("List wallets and balances"))
        .subcommand(Command::new("transactions").about("List recent transactions"))
        .subcommand(
            Command::new("send")
                .about("Send money to another wallet")
                .arg(amount_arg())
                .arg(currency_arg())
                .arg(
                    Arg::new("to")
                        .long("to")
                        .required(true)
                        .help("Recipient account number"),
                )
                .arg(Arg::new("narration").long("narration")),
        )
        .subcommand(
            Command::new("payout")
                .about("Pay out to a bank account")
                .arg(amount_arg())
                .arg(currency_arg())
                .arg(Arg::new("bank").long("bank").required(true))
                .arg(Arg::new("account").long("account").required(true))
                .arg(Arg::new("name").long("name").help("Account holder name")),
        )
        .subcommand(
            Command::new("fx-payout")
                .about("Pay out with currency conversion at a quoted rate")
                .arg(amount_arg())
                .arg(
                    Arg::new("from-currency")
                        .long("from-currency")
                        .required(true),
                )
                .arg(Arg::new("to-currency").long("to-currency").required(true))
                .arg(
                    Arg::new("rate")
                        .long("rate")
                        .required(true)
                        .help("Quoted FX rate being accepted"),
                )
                .arg(Arg::new("bank").long("bank").required(true))
                .arg(Arg::new("account").long("account").required(true)),
        )
        .subcommand(
            Command::new("billpay")
                .about("Pay a bill")
                .arg(Arg::new("biller").long("biller").required(true))
                .arg(
                    Arg::new("reference")
                        .long("reference")
                        .required(true)
                        .help("Account/meter/smartcard number"),
                )
                .arg(amount_arg())
                .arg(currency_arg()),
        )
        .subcommand(
            Command::new("airtime")
                .about("Buy airtime")
                .arg(Arg::new("phone").long("phone").required(true))
                .arg(amount_arg())
                .arg(currency_arg()),
        )
        .subcommand(
            Command::new("cards")
                .about("Virtual card management")
                .subcommand_required(true)
                .subcommand(Command::new("list").about("List cards"))
                .subcommand(Command::new("create").about("Create a card").arg(currency_arg()))
                .subcommand(
                    Command::new("fund")
                        .about("Fund a card from the wallet")
                        .arg(Arg::new("card").long("card").required(true))
                        .arg(amount_arg()),
                )
                .subcommand(
                    Command::new("freeze")
                        .about("Freeze or unfreeze a card")
                        .arg(Arg::new("card").long("card").required(true))
                        .arg(
                            Arg::new("unfreeze")
                                .long("unfreeze")
                                .action(ArgAction::SetTrue),
                        ),
                ),
        )
        .subcommand(
            Command::new("deposit")
                .about("Deposit through a payment processor")
                .arg(amount_arg())
                .arg(currency_arg())
                .arg(
                    Arg::new("provider")
                        .long("provider")
                        .required(true)
                        .help("Processor slug, e.g. flutterwave or squad"),
                ),
        )
        .subcommand(
            Command::new("token-send")
                .about("Send money collectable with a control number")
                .arg(amount_arg())
                .arg(currency_arg())
                .arg(Arg::new("name").long("name").required(true))
                .arg(Arg::new("phone").long("phone").required(true)),
        )
        .subcommand(
            Command::new("token-redeem")
                .about("Redeem a control number into the wallet")
                .arg(Arg::new("code").long("code").required(true)),
        )
        .subcommand(
            Command::new("tickets")
                .about("Support tickets")
                .subcommand_required(true)
                .subcommand(Command::new("list").about("List tickets"))
                .subcommand(
                    Command::new("open")
                        .about("Open a ticket")
                        .arg(Arg::new("subject").long("subject").required(true))
                        .arg(Arg::new("message").long("message").required(true)),
                )
                .subcommand(
                    Command::new("reply")
                        .about("Reply on a ticket")
                        .arg(Arg::new("ticket").long("ticket").required(true))
                        .arg(Arg::new("message").long("message").required(true)),
                ),
        )
        .subcommand(
            Command::new("change-pin")
                .about("Change the step-up PIN")
                .arg(Arg::new("new-pin").long("new-pin").required(true)),
        )
        .subcommand(
            Command::new("change-password")
                .about("Change the account password")
                .arg(Arg::new("current").long("current").required(true))
                .arg(Arg::new("new").long("new").required(true)),
        )
        .subcommand(
            Command::new("change-phone")
                .about("Change the registered phone number")
                .arg(Arg::new("phone").long("phone").required(true)),
        );

    logging::with_args(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "tumapay");
        assert_eq!(
            command.get_about().map(ToString::to_string),
            Some(env!("CARGO_PKG_DESCRIPTION").to_string())
        );
        assert_eq!(
            command.get_version().map(ToString::to_string),
            Some(env!("CARGO_PKG_VERSION").to_string())
        );
    }

    #[test]
    fn test_send_subcommand() {
        let matches = new().get_matches_from(vec![
            "tumapay", "send", "--amount", "100.00", "--currency", "KES", "--to", "0011223344",
        ]);
        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "send");
        assert_eq!(sub.get_one::<String>("amount").cloned(), Some("100.00".to_string()));
        assert_eq!(sub.get_one::<String>("to").cloned(), Some("0011223344".to_string()));
    }

    #[test]
    fn test_check_env() {
        temp_env::with_vars(
            [
                ("TUMAPAY_API_URL", Some("https://staging.tumapay.dev")),
                ("TUMAPAY_TIMEOUT", Some("5")),
                ("TUMAPAY_LOG_LEVEL", Some("info")),
            ],
            || {
                let matches = new().get_matches_from(vec!["tumapay", "wallets"]);
                assert_eq!(
                    matches.get_one::<String>(ARG_API_URL).cloned(),
                    Some("https://staging.tumapay.dev".to_string())
                );
                assert_eq!(matches.get_one::<u64>(ARG_TIMEOUT).copied(), Some(5));
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    Some(2)
                );
            },
        );
    }

    #[test]
    fn test_check_log_level_env() {
        let levels = vec!["error", "warn", "info", "debug", "trace"];
        for (index, &level) in levels.iter().enumerate() {
            temp_env::with_vars([("TUMAPAY_LOG_LEVEL", Some(level))], || {
                let matches = new().get_matches_from(vec!["tumapay", "wallets"]);
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    Some(index as u8)
                );
            });
        }
    }

    #[test]
    fn test_check_log_level_verbosity() {
        for count in 0..4_usize {
            temp_env::with_vars([("TUMAPAY_LOG_LEVEL", None::<String>)], || {
                let mut args = vec!["tumapay".to_string(), "wallets".to_string()];
                if count > 0 {
                    args.push(format!("-{}", "v".repeat(count)));
                }
                let matches = new().get_matches_from(args);
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    Some(count as u8)
                );
            });
        }
    }
}
