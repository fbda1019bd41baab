//! Response parsing: the agent's final text to an [`AgentOutputRecord`].

mod parser;
mod repair;

pub use parser::{
    parse_response, parse_sections, parse_structured, split_action_items, AgentOutputRecord,
    SECTION_LABELS,
};
pub use repair::{needs_calendar_repair, repair_calendar, repair_summary};
