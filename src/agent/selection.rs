//! Turn selection
//!
//! Decides which agent speaks next from the roster and the history alone.
//! Payload parse failures end the turn; they never propagate.

use tracing::{debug, warn};

use crate::agent::roster::{AgentRef, AgentRoster};
use crate::core::{Message, Role, CLU_RESULT, CQA_RESULT};

/// Pick the next agent, or `None` to end the conversation
///
/// First match wins:
/// 1. empty history or a user message last: the entry agent
/// 2. the entry agent spoke last: the routing agent on `clu_result`,
///    otherwise `None`
/// 3. the routing agent spoke last: the agent named by `target_agent`
/// 4. anything else: `None`
pub fn select(roster: &AgentRoster, history: &[Message]) -> Option<AgentRef> {
    let Some(last) = history.last() else {
        return roster.entry().cloned();
    };

    if last.role == Role::User {
        return roster.entry().cloned();
    }

    if last.is_from(roster.entry_name()) {
        return after_entry(roster, last);
    }

    if last.is_from(roster.routing_name()) {
        return after_routing(roster, last);
    }

    debug!(agent = ?last.name, "leaf agent spoke last, ending turn");
    None
}

fn after_entry(roster: &AgentRoster, last: &Message) -> Option<AgentRef> {
    let payload = match last.payload() {
        Ok(payload) => payload,
        Err(e) => {
            warn!(agent = roster.entry_name(), error = %e, "unparsable entry payload");
            return None;
        }
    };

    match payload.kind() {
        Some(CLU_RESULT) => {
            debug!(
                intent = payload.top_intent().unwrap_or("unknown"),
                "intent classified, handing to routing agent"
            );
            roster.routing().cloned()
        }
        Some(CQA_RESULT) => {
            debug!("question answered by entry agent");
            None
        }
        other => {
            debug!(kind = ?other, "entry payload has no known type");
            None
        }
    }
}

fn after_routing(roster: &AgentRoster, last: &Message) -> Option<AgentRef> {
    let payload = match last.payload() {
        Ok(payload) => payload,
        Err(e) => {
            warn!(agent = roster.routing_name(), error = %e, "unparsable routing payload");
            return None;
        }
    };

    let target = payload.target_agent()?;
    match roster.get(target) {
        Some(agent) => {
            debug!(
                agent = target,
                intent = payload.intent().unwrap_or(""),
                entities = payload.entities().map_or(0, Vec::len),
                "routing to leaf agent"
            );
            Some(agent.clone())
        }
        None => {
            warn!(agent = target, "routing target is not in the roster");
            None
        }
    }
}
