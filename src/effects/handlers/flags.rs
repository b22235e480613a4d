//! Handlers that only touch the evaluation context.

use crate::conditions::keys;
use crate::effects::handler::{EffectHandler, HandlerCall};

/// Deny whatever is being resolved.
///
/// Inside a challenge (the context carries `challenge.denied`) this denies
/// the challenge; anywhere else it sets `denied`.
pub struct Deny;

impl EffectHandler for Deny {
    fn apply(&self, call: &mut HandlerCall<'_>) {
        if call.ctx.contains_key(keys::CHALLENGE_DENIED) {
            call.ctx.set_flag(keys::CHALLENGE_DENIED, true);
            call.note(format_args!("deny (challenge) via {}", call.step.name));
        } else {
            call.ctx.set_flag(keys::DENIED, true);
            call.note(format_args!("deny via {}", call.step.name));
        }
    }
}

pub struct DenyChallenge;

impl EffectHandler for DenyChallenge {
    fn apply(&self, call: &mut HandlerCall<'_>) {
        call.ctx.set_flag(keys::CHALLENGE_DENIED, true);
        call.note(format_args!("deny_challenge triggered ({})", call.step.name));
    }
}

/// Sets one protection flag.
pub struct Protect(pub &'static str);

impl EffectHandler for Protect {
    fn apply(&self, call: &mut HandlerCall<'_>) {
        call.ctx.set_flag(self.0, true);
    }
}

const PROTECTIONS: [(&str, &str); 3] = [
    ("steal", keys::PROTECT_STEAL),
    ("destroy", keys::PROTECT_DESTROY),
    ("challenge", keys::PROTECT_CHALLENGE),
];

/// Clear the protections named in the step's parameters, or all of them.
pub struct RemoveProtection;

impl EffectHandler for RemoveProtection {
    fn apply(&self, call: &mut HandlerCall<'_>) {
        let text = call
            .step
            .parameter_texts()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        let named: Vec<&str> = PROTECTIONS
            .iter()
            .filter(|(word, _)| text.contains(word))
            .map(|&(_, key)| key)
            .collect();
        let cleared = if named.is_empty() {
            PROTECTIONS.iter().map(|&(_, key)| key).collect()
        } else {
            named
        };
        for key in &cleared {
            call.ctx.remove(key);
        }
        call.note(format_args!("removed protection {}", cleared.join(", ")));
    }
}

pub struct DoNothing;

impl EffectHandler for DoNothing {
    fn apply(&self, _call: &mut HandlerCall<'_>) {}
}
