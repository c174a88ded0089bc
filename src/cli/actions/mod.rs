use crate::cli::globals::GlobalArgs;
use secrecy::SecretString;

// Internal "interpreter" for `Action`.
// We keep the match in a separate module so `mod.rs` stays small as more actions are added.
mod run;

#[derive(Debug)]
pub enum Action {
    Login {
        email: String,
        password: SecretString,
        remember_biometrics: bool,
    },
    BiometricLogin,
    Logout {
        forget_biometrics: bool,
    },
    Register {
        email: String,
        password: SecretString,
        phone: String,
        first_name: String,
        last_name: String,
    },
    Wallets,
    Transactions,
    Send {
        amount: String,
        currency: String,
        to: String,
        narration: Option<String>,
    },
    Payout {
        amount: String,
        currency: String,
        bank: String,
        account: String,
        name: Option<String>,
    },
    FxPayout {
        amount: String,
        from_currency: String,
        to_currency: String,
        rate: String,
        bank: String,
        account: String,
    },
    BillPay {
        biller: String,
        reference: String,
        amount: String,
        currency: String,
    },
    Airtime {
        phone: String,
        amount: String,
        currency: String,
    },
    CardList,
    CardCreate {
        currency: String,
    },
    CardFund {
        card: String,
        amount: String,
    },
    CardFreeze {
        card: String,
        frozen: bool,
    },
    Deposit {
        amount: String,
        currency: String,
        provider: String,
    },
    TokenSend {
        amount: String,
        currency: String,
        name: String,
        phone: String,
    },
    TokenRedeem {
        code: String,
    },
    TicketList,
    TicketOpen {
        subject: String,
        message: String,
    },
    TicketReply {
        ticket: String,
        message: String,
    },
    ChangePin {
        new_pin: String,
    },
    ChangePassword {
        current: SecretString,
        new: SecretString,
    },
    ChangePhone {
        phone: String,
    },
}

impl Action {
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self, globals: &GlobalArgs) -> anyhow::Result<()> {
        run::execute(self, globals).await
    }
}
