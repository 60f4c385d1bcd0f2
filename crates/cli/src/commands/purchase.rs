use agribazaar_core::config::{AppConfig, LoadOptions};
use agribazaar_core::{FlowTransitionError, NavigationParams, PaymentHandoff, PurchaseSession};
use clap::Args;
use serde_json::{json, Value};

use super::CommandResult;

const COMMAND: &str = "purchase";

#[derive(Debug, Clone, Default, Args)]
pub struct PurchaseArgs {
    #[arg(long, help = "Product identifier")]
    pub id: Option<String>,
    #[arg(long, help = "Product display name")]
    pub name: Option<String>,
    #[arg(long, allow_hyphen_values = true, help = "Unit price, e.g. 10.00")]
    pub price: Option<String>,
    #[arg(long, allow_hyphen_values = true, help = "Available stock")]
    pub stock: Option<String>,
    #[arg(long, allow_hyphen_values = true, help = "Requested quantity, as typed by the buyer")]
    pub quantity: Option<String>,
    #[arg(long, conflicts_with = "confirm", help = "Dismiss the confirmation prompt")]
    pub cancel: bool,
    #[arg(long, help = "Confirm the purchase and hand off to payment")]
    pub confirm: bool,
}

impl PurchaseArgs {
    fn navigation(&self) -> NavigationParams {
        NavigationParams {
            id: self.id.clone(),
            name: self.name.clone(),
            price: self.price.clone(),
            quantity: self.stock.clone(),
        }
    }
}

/// Requests the purchase, then cancels or confirms it when asked. Without either
/// flag the session is left awaiting confirmation and the prompt is reported.
pub fn run(args: &PurchaseArgs) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "config_validation",
                format!("config validation failed: {error}"),
                2,
            )
        }
    };

    let mut session = PurchaseSession::from_navigation(&args.navigation())
        .with_payment_destination(config.payment.destination);

    match drive(&mut session, args) {
        Ok(outcome) => CommandResult::success_with(
            COMMAND,
            outcome.message,
            Some(details(&session, outcome.prompt, outcome.handoff)),
        ),
        Err(error) => {
            let error_class = match error {
                FlowTransitionError::ValidationPending { .. } => "quantity_validation",
                FlowTransitionError::InvalidTransition { .. } => "invalid_transition",
            };
            let message = match &error {
                FlowTransitionError::ValidationPending { error, .. } => error.to_string(),
                other => other.to_string(),
            };
            CommandResult::failure_with(
                COMMAND,
                error_class,
                message,
                1,
                Some(details(&session, None, None)),
            )
        }
    }
}

struct Outcome {
    message: String,
    prompt: Option<String>,
    handoff: Option<PaymentHandoff>,
}

fn drive(session: &mut PurchaseSession, args: &PurchaseArgs) -> Result<Outcome, FlowTransitionError> {
    if let Some(raw) = args.quantity.as_deref() {
        session.set_quantity(raw)?;
    }

    session.request_purchase()?;
    let prompt = session.confirmation_prompt();

    if args.confirm {
        let handoff = session.confirm()?;
        return Ok(Outcome { message: handoff.summary(), prompt, handoff: Some(handoff) });
    }

    if args.cancel {
        session.cancel()?;
        let message = format!(
            "purchase cancelled; draft kept at {} unit(s)",
            session.draft().requested_quantity
        );
        return Ok(Outcome { message, prompt, handoff: None });
    }

    let message = prompt.clone().unwrap_or_default();
    Ok(Outcome { message, prompt, handoff: None })
}

fn details(
    session: &PurchaseSession,
    prompt: Option<String>,
    handoff: Option<PaymentHandoff>,
) -> Value {
    let draft = session.draft();
    json!({
        "session_id": session.id(),
        "state": session.state(),
        "quantity": draft.requested_quantity,
        "total_price": draft.total_display(),
        "error": draft.validation_message(),
        "prompt": prompt,
        "handoff": handoff,
    })
}
