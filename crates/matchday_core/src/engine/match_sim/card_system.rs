//! Card tracking with dismissal support (yellow accumulation + straight reds).

use std::collections::{HashMap, HashSet};

use crate::models::{Outcome, PlayerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardType {
    Yellow,
    Red,
}

impl CardType {
    pub fn from_outcome(outcome: Outcome) -> Option<Self> {
        match outcome {
            Outcome::YellowCard => Some(CardType::Yellow),
            Outcome::RedCard => Some(CardType::Red),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardResult {
    Booked,
    SentOff,
}

/// Cards for one side.
#[derive(Debug, Clone, Default)]
pub struct CardSystem {
    yellow_cards: HashMap<PlayerId, u8>,
    sent_off: HashSet<PlayerId>,
}

impl CardSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue_card(&mut self, player: PlayerId, card_type: CardType) -> (CardResult, u8) {
        match card_type {
            CardType::Yellow => {
                let count = {
                    let entry = self.yellow_cards.entry(player).or_insert(0);
                    *entry = entry.saturating_add(1);
                    *entry
                };
                if count >= 2 {
                    self.sent_off.insert(player);
                    (CardResult::SentOff, count)
                } else {
                    (CardResult::Booked, count)
                }
            }
            CardType::Red => {
                self.sent_off.insert(player);
                (CardResult::SentOff, self.yellow_count(player))
            }
        }
    }

    pub fn is_sent_off(&self, player: PlayerId) -> bool {
        self.sent_off.contains(&player)
    }

    pub fn yellow_count(&self, player: PlayerId) -> u8 {
        self.yellow_cards.get(&player).copied().unwrap_or(0)
    }

    pub fn sent_off_count(&self) -> usize {
        self.sent_off.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_yellow_sends_off() {
        let mut cards = CardSystem::new();
        let (result, count) = cards.issue_card(PlayerId(7), CardType::Yellow);
        assert_eq!(result, CardResult::Booked);
        assert_eq!(count, 1);
        assert!(!cards.is_sent_off(PlayerId(7)));

        let (result, count) = cards.issue_card(PlayerId(7), CardType::Yellow);
        assert_eq!(result, CardResult::SentOff);
        assert_eq!(count, 2);
        assert!(cards.is_sent_off(PlayerId(7)));
    }

    #[test]
    fn test_straight_red() {
        let mut cards = CardSystem::new();
        let (result, count) = cards.issue_card(PlayerId(3), CardType::Red);
        assert_eq!(result, CardResult::SentOff);
        assert_eq!(count, 0);
        assert!(cards.is_sent_off(PlayerId(3)));
        assert_eq!(cards.sent_off_count(), 1);
    }

    #[test]
    fn test_card_outcomes() {
        assert_eq!(CardType::from_outcome(Outcome::YellowCard), Some(CardType::Yellow));
        assert_eq!(CardType::from_outcome(Outcome::RedCard), Some(CardType::Red));
        assert_eq!(CardType::from_outcome(Outcome::NoCard), None);
    }
}
