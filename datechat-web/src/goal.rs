//! Chat goals and the instruction text derived from them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What the generated persona is trying to achieve in the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChatGoal {
    Sex,
    Relationship,
    Activities,
}

/// Instruction sent ahead of the conversation; `{goal}` is replaced by
/// [`ChatGoal::description`].
const INSTRUCTION_TEMPLATE: &str = "You are a person in the age between 30 and 50 who is searching for a date. \
You use are using a chat-app (like in Tinder), to talk to your potential partner. Please respond to his/her chat-messages! \
Your goal is to convince your chat partner that you are the right partner for {goal}. \
You should ask the relevant question regarding your goal by your fourth answer at the latest.";

/// Scripted first message of the simulated partner.
pub const OPENING_LINE: &str = "Hey, nice to meet you here. Such a nice profile. :) I look forward to learning more about you. Have you had a good day so far? \
What would you like to know about me before we pick up the phone or meet? ;)";

impl ChatGoal {
    pub const ALL: [ChatGoal; 3] = [ChatGoal::Sex, ChatGoal::Relationship, ChatGoal::Activities];

    /// Form/wire name, e.g. `RELATIONSHIP`.
    pub const fn name(self) -> &'static str {
        match self {
            ChatGoal::Sex => "SEX",
            ChatGoal::Relationship => "RELATIONSHIP",
            ChatGoal::Activities => "ACTIVITIES",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            ChatGoal::Sex => "an affair and casual sex dates",
            ChatGoal::Relationship => "a serious relationship",
            ChatGoal::Activities => "leisure activities and friendship",
        }
    }

    /// Full instruction text for the completion call.
    pub fn instruction(self) -> String {
        INSTRUCTION_TEMPLATE.replace("{goal}", self.description())
    }

    /// Lower-case name shown in the chat view.
    pub fn display_name(self) -> String {
        self.name().to_lowercase()
    }
}

impl fmt::Display for ChatGoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned for any goal outside the fixed set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("goal: must be one of SEX, RELATIONSHIP, ACTIVITIES")]
pub struct UnknownGoal(pub String);

impl FromStr for ChatGoal {
    type Err = UnknownGoal;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChatGoal::ALL
            .into_iter()
            .find(|goal| goal.name() == s.trim())
            .ok_or_else(|| UnknownGoal(s.to_string()))
    }
}
