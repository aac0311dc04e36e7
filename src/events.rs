//! Receipt events emitted by the host and assertions that locate them.
//!
//! The host reports each event as an object holding a `type` tag plus one
//! field named after that tag (`stx_transfer_event`, `ft_mint_event`, ...).
//! The assertions in [`EventAssertions`] scan a slice of events in order and
//! return the decoded fields of the first event that matches; when nothing
//! matches they fail with [`HarnessError::EventNotFound`].

use crate::error::{HarnessError, Result};
use crate::value::ClarityText;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stx_transfer_event: Option<StxTransferEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stx_burn_event: Option<StxBurnEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ft_transfer_event: Option<FtTransferEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ft_mint_event: Option<FtMintEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ft_burn_event: Option<FtBurnEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nft_transfer_event: Option<NftTransferEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nft_mint_event: Option<NftMintEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nft_burn_event: Option<NftBurnEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_event: Option<ContractEvent>,
}

impl Event {
    pub fn stx_transfer(amount: u128, sender: &str, recipient: &str) -> Self {
        Event {
            kind: Some("stx_transfer_event".to_string()),
            stx_transfer_event: Some(StxTransferEvent {
                sender: ClarityText::from(sender),
                recipient: ClarityText::from(recipient),
                amount: ClarityText::from(amount.to_string()),
            }),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StxTransferEvent {
    pub sender: ClarityText,
    pub recipient: ClarityText,
    pub amount: ClarityText,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StxBurnEvent {
    pub sender: ClarityText,
    pub amount: ClarityText,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FtTransferEvent {
    pub asset_identifier: String,
    pub sender: ClarityText,
    pub recipient: ClarityText,
    pub amount: ClarityText,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FtMintEvent {
    pub asset_identifier: String,
    pub recipient: ClarityText,
    pub amount: ClarityText,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FtBurnEvent {
    pub asset_identifier: String,
    pub sender: ClarityText,
    pub amount: ClarityText,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NftTransferEvent {
    pub asset_identifier: String,
    pub sender: ClarityText,
    pub recipient: ClarityText,
    pub value: ClarityText,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NftMintEvent {
    pub asset_identifier: String,
    pub recipient: ClarityText,
    pub value: ClarityText,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NftBurnEvent {
    pub asset_identifier: String,
    pub sender: ClarityText,
    pub value: ClarityText,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractEvent {
    pub contract_identifier: ClarityText,
    pub topic: String,
    pub value: ClarityText,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StxTransferMatch {
    pub amount: u128,
    pub sender: String,
    pub recipient: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StxBurnMatch {
    pub amount: u128,
    pub sender: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FtTransferMatch {
    pub amount: u128,
    pub sender: String,
    pub recipient: String,
    pub asset_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FtMintMatch {
    pub amount: u128,
    pub recipient: String,
    pub asset_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FtBurnMatch {
    pub amount: u128,
    pub sender: String,
    pub asset_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NftTransferMatch {
    pub token_id: ClarityText,
    pub sender: String,
    pub recipient: String,
    pub asset_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NftMintMatch {
    pub token_id: ClarityText,
    pub recipient: String,
    pub asset_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NftBurnMatch {
    pub token_id: ClarityText,
    pub sender: String,
    pub asset_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintMatch {
    pub contract_identifier: String,
    pub topic: String,
    pub value: ClarityText,
}

/// Lookups over the events of a receipt or read-only call.
///
/// Amounts compare against the bare decimal the host prints. Principals
/// compare verbatim. Fungible assets match when the asset identifier ends
/// with `asset_id`; non-fungible assets require the exact
/// `asset_address::asset_id` identifier and token id text.
pub trait EventAssertions {
    fn expect_stx_transfer_event(
        &self,
        amount: u128,
        sender: &str,
        recipient: &str,
    ) -> Result<StxTransferMatch>;

    fn expect_stx_burn_event(&self, amount: u128, sender: &str) -> Result<StxBurnMatch>;

    fn expect_fungible_token_transfer_event(
        &self,
        amount: u128,
        sender: &str,
        recipient: &str,
        asset_id: &str,
    ) -> Result<FtTransferMatch>;

    fn expect_fungible_token_mint_event(
        &self,
        amount: u128,
        recipient: &str,
        asset_id: &str,
    ) -> Result<FtMintMatch>;

    fn expect_fungible_token_burn_event(
        &self,
        amount: u128,
        sender: &str,
        asset_id: &str,
    ) -> Result<FtBurnMatch>;

    fn expect_non_fungible_token_transfer_event(
        &self,
        token_id: &str,
        sender: &str,
        recipient: &str,
        asset_address: &str,
        asset_id: &str,
    ) -> Result<NftTransferMatch>;

    fn expect_non_fungible_token_mint_event(
        &self,
        token_id: &str,
        recipient: &str,
        asset_address: &str,
        asset_id: &str,
    ) -> Result<NftMintMatch>;

    fn expect_non_fungible_token_burn_event(
        &self,
        token_id: &str,
        sender: &str,
        asset_address: &str,
        asset_id: &str,
    ) -> Result<NftBurnMatch>;

    /// Match a `print` contract event whose value ends with `value`.
    fn expect_print_event(&self, contract_identifier: &str, value: &str) -> Result<PrintMatch>;
}

impl EventAssertions for [Event] {
    fn expect_stx_transfer_event(
        &self,
        amount: u128,
        sender: &str,
        recipient: &str,
    ) -> Result<StxTransferMatch> {
        scan(
            self,
            || format!("STXTransferEvent({}, {}, {})", amount, sender, recipient),
            |event| {
                let e = event.stx_transfer_event.as_ref()?;
                Some(StxTransferMatch {
                    amount: expect_amount(&e.amount, amount).ok()?,
                    sender: e.sender.expect_principal(sender).ok()?,
                    recipient: e.recipient.expect_principal(recipient).ok()?,
                })
            },
        )
    }

    fn expect_stx_burn_event(&self, amount: u128, sender: &str) -> Result<StxBurnMatch> {
        scan(
            self,
            || format!("STXBurnEvent({}, {})", amount, sender),
            |event| {
                let e = event.stx_burn_event.as_ref()?;
                Some(StxBurnMatch {
                    amount: expect_amount(&e.amount, amount).ok()?,
                    sender: e.sender.expect_principal(sender).ok()?,
                })
            },
        )
    }

    fn expect_fungible_token_transfer_event(
        &self,
        amount: u128,
        sender: &str,
        recipient: &str,
        asset_id: &str,
    ) -> Result<FtTransferMatch> {
        scan(
            self,
            || {
                format!(
                    "FungibleTokenTransferEvent({}, {}, {}, {})",
                    amount, sender, recipient, asset_id
                )
            },
            |event| {
                let e = event.ft_transfer_event.as_ref()?;
                if !e.asset_identifier.ends_with(asset_id) {
                    return None;
                }
                Some(FtTransferMatch {
                    amount: expect_amount(&e.amount, amount).ok()?,
                    sender: e.sender.expect_principal(sender).ok()?,
                    recipient: e.recipient.expect_principal(recipient).ok()?,
                    asset_id: e.asset_identifier.clone(),
                })
            },
        )
    }

    fn expect_fungible_token_mint_event(
        &self,
        amount: u128,
        recipient: &str,
        asset_id: &str,
    ) -> Result<FtMintMatch> {
        scan(
            self,
            || format!("FungibleTokenMintEvent({}, {}, {})", amount, recipient, asset_id),
            |event| {
                let e = event.ft_mint_event.as_ref()?;
                if !e.asset_identifier.ends_with(asset_id) {
                    return None;
                }
                Some(FtMintMatch {
                    amount: expect_amount(&e.amount, amount).ok()?,
                    recipient: e.recipient.expect_principal(recipient).ok()?,
                    asset_id: e.asset_identifier.clone(),
                })
            },
        )
    }

    fn expect_fungible_token_burn_event(
        &self,
        amount: u128,
        sender: &str,
        asset_id: &str,
    ) -> Result<FtBurnMatch> {
        scan(
            self,
            || format!("FungibleTokenBurnEvent({}, {}, {})", amount, sender, asset_id),
            |event| {
                let e = event.ft_burn_event.as_ref()?;
                if !e.asset_identifier.ends_with(asset_id) {
                    return None;
                }
                Some(FtBurnMatch {
                    amount: expect_amount(&e.amount, amount).ok()?,
                    sender: e.sender.expect_principal(sender).ok()?,
                    asset_id: e.asset_identifier.clone(),
                })
            },
        )
    }

    fn expect_non_fungible_token_transfer_event(
        &self,
        token_id: &str,
        sender: &str,
        recipient: &str,
        asset_address: &str,
        asset_id: &str,
    ) -> Result<NftTransferMatch> {
        let identifier = format!("{}::{}", asset_address, asset_id);
        scan(
            self,
            || {
                format!(
                    "NonFungibleTokenTransferEvent({}, {}, {}, {})",
                    token_id, sender, recipient, identifier
                )
            },
            |event| {
                let e = event.nft_transfer_event.as_ref()?;
                if e.value != token_id || e.asset_identifier != identifier {
                    return None;
                }
                Some(NftTransferMatch {
                    token_id: e.value.clone(),
                    sender: e.sender.expect_principal(sender).ok()?,
                    recipient: e.recipient.expect_principal(recipient).ok()?,
                    asset_id: e.asset_identifier.clone(),
                })
            },
        )
    }

    fn expect_non_fungible_token_mint_event(
        &self,
        token_id: &str,
        recipient: &str,
        asset_address: &str,
        asset_id: &str,
    ) -> Result<NftMintMatch> {
        let identifier = format!("{}::{}", asset_address, asset_id);
        scan(
            self,
            || format!("NonFungibleTokenMintEvent({}, {}, {})", token_id, recipient, identifier),
            |event| {
                let e = event.nft_mint_event.as_ref()?;
                if e.value != token_id || e.asset_identifier != identifier {
                    return None;
                }
                Some(NftMintMatch {
                    token_id: e.value.clone(),
                    recipient: e.recipient.expect_principal(recipient).ok()?,
                    asset_id: e.asset_identifier.clone(),
                })
            },
        )
    }

    fn expect_non_fungible_token_burn_event(
        &self,
        token_id: &str,
        sender: &str,
        asset_address: &str,
        asset_id: &str,
    ) -> Result<NftBurnMatch> {
        let identifier = format!("{}::{}", asset_address, asset_id);
        scan(
            self,
            || format!("NonFungibleTokenBurnEvent({}, {}, {})", token_id, sender, identifier),
            |event| {
                let e = event.nft_burn_event.as_ref()?;
                if e.value != token_id || e.asset_identifier != identifier {
                    return None;
                }
                Some(NftBurnMatch {
                    token_id: e.value.clone(),
                    sender: e.sender.expect_principal(sender).ok()?,
                    asset_id: e.asset_identifier.clone(),
                })
            },
        )
    }

    fn expect_print_event(&self, contract_identifier: &str, value: &str) -> Result<PrintMatch> {
        scan(
            self,
            || format!("PrintEvent({}, {})", contract_identifier, value),
            |event| {
                let e = event.contract_event.as_ref()?;
                if !e.topic.ends_with("print") || !e.value.as_str().ends_with(value) {
                    return None;
                }
                Some(PrintMatch {
                    contract_identifier: e.contract_identifier.expect_principal(contract_identifier).ok()?,
                    topic: e.topic.clone(),
                    value: e.value.clone(),
                })
            },
        )
    }
}

fn scan<T>(
    events: &[Event],
    describe: impl FnOnce() -> String,
    matcher: impl Fn(&Event) -> Option<T>,
) -> Result<T> {
    match events.iter().find_map(matcher) {
        Some(found) => Ok(found),
        None => {
            let description = describe();
            debug!(candidates = events.len(), "no event matched {}", description);
            Err(HarnessError::EventNotFound(description))
        }
    }
}

fn expect_amount(text: &ClarityText, amount: u128) -> Result<u128> {
    let expected = amount.to_string();
    if text.as_str() != expected {
        return Err(HarnessError::mismatch(expected, text.as_str()));
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ft_mint(asset_identifier: &str, amount: &str, recipient: &str) -> Event {
        Event {
            kind: Some("ft_mint_event".to_string()),
            ft_mint_event: Some(FtMintEvent {
                asset_identifier: asset_identifier.to_string(),
                recipient: ClarityText::from(recipient),
                amount: ClarityText::from(amount),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_ft_mint_matches_asset_suffix() {
        let events = vec![ft_mint("X.foo::bar", "5", "'P")];

        let found = events.expect_fungible_token_mint_event(5, "'P", "bar").unwrap();
        assert_eq!(found.amount, 5);
        assert_eq!(found.recipient, "'P");
        assert_eq!(found.asset_id, "X.foo::bar");

        let err = events.expect_fungible_token_mint_event(5, "'P", "baz").unwrap_err();
        assert!(matches!(err, HarnessError::EventNotFound(_)));
    }

    #[test]
    fn test_first_structural_match_wins_and_mismatches_are_skipped() {
        let events = vec![
            Event::stx_transfer(10, "A", "B"),
            ft_mint("X.foo::bar", "7", "'Q"),
            Event::stx_transfer(25, "A", "C"),
        ];
        let found = events.expect_stx_transfer_event(25, "A", "C").unwrap();
        assert_eq!(found.recipient, "C");
        assert!(events.expect_stx_transfer_event(25, "A", "B").is_err());
    }

    #[test]
    fn test_empty_event_list_fails() {
        let events: Vec<Event> = Vec::new();
        let err = events.expect_stx_burn_event(1, "A").unwrap_err();
        assert_eq!(err, HarnessError::EventNotFound("STXBurnEvent(1, A)".to_string()));
    }

    #[test]
    fn test_nft_requires_exact_identifier_and_token() {
        let events = vec![Event {
            kind: Some("nft_transfer_event".to_string()),
            nft_transfer_event: Some(NftTransferEvent {
                asset_identifier: "ST1.donorpass::donorpass".to_string(),
                sender: ClarityText::from("W2"),
                recipient: ClarityText::from("W3"),
                value: ClarityText::from("u1"),
            }),
            ..Default::default()
        }];
        let found = events
            .expect_non_fungible_token_transfer_event("u1", "W2", "W3", "ST1.donorpass", "donorpass")
            .unwrap();
        assert_eq!(found.token_id, "u1");
        assert!(events
            .expect_non_fungible_token_transfer_event("u2", "W2", "W3", "ST1.donorpass", "donorpass")
            .is_err());
        assert!(events
            .expect_non_fungible_token_transfer_event("u1", "W2", "W3", "ST1.other", "donorpass")
            .is_err());
    }

    #[test]
    fn test_stx_burn_reports_amount_and_sender() {
        let events = vec![
            Event::stx_transfer(3, "A", "B"),
            Event {
                kind: Some("stx_burn_event".to_string()),
                stx_burn_event: Some(StxBurnEvent {
                    sender: ClarityText::from("A"),
                    amount: ClarityText::from("40"),
                }),
                ..Default::default()
            },
        ];
        let burned = events.expect_stx_burn_event(40, "A").unwrap();
        assert_eq!(burned, StxBurnMatch { amount: 40, sender: "A".to_string() });
        assert!(events.expect_stx_burn_event(3, "A").is_err());
        assert!(events.expect_stx_burn_event(40, "B").is_err());
    }

    #[test]
    fn test_nft_burn_requires_exact_identifier_and_token() {
        let events = vec![Event {
            kind: Some("nft_burn_event".to_string()),
            nft_burn_event: Some(NftBurnEvent {
                asset_identifier: "ST1.donorpass::donorpass".to_string(),
                sender: ClarityText::from("W2"),
                value: ClarityText::from("u7"),
            }),
            ..Default::default()
        }];
        let burned = events
            .expect_non_fungible_token_burn_event("u7", "W2", "ST1.donorpass", "donorpass")
            .unwrap();
        assert_eq!(burned.token_id, "u7");
        assert_eq!(burned.sender, "W2");
        assert_eq!(burned.asset_id, "ST1.donorpass::donorpass");

        let err = events
            .expect_non_fungible_token_burn_event("u8", "W2", "ST1.donorpass", "donorpass")
            .unwrap_err();
        assert!(matches!(err, HarnessError::EventNotFound(_)));
        // Suffixes of the identifier are not enough.
        assert!(events
            .expect_non_fungible_token_burn_event("u7", "W2", "donorpass", "donorpass")
            .is_err());
        assert!(events
            .expect_non_fungible_token_burn_event("u7", "W2", "ST1.donorpass", "pass")
            .is_err());
        assert!(events
            .expect_non_fungible_token_burn_event("u7", "W3", "ST1.donorpass", "donorpass")
            .is_err());
    }

    #[test]
    fn test_print_event_matches_value_suffix() {
        let events = vec![Event {
            kind: Some("contract_event".to_string()),
            contract_event: Some(ContractEvent {
                contract_identifier: ClarityText::from("ST1.clearfund"),
                topic: "print".to_string(),
                value: ClarityText::from("{ action: \"pledge\", amount: u1000 }"),
            }),
            ..Default::default()
        }];
        let found = events.expect_print_event("ST1.clearfund", "amount: u1000 }").unwrap();
        assert_eq!(found.topic, "print");
        assert!(events.expect_print_event("ST1.other", "u1000 }").is_err());
    }

    #[test]
    fn test_event_deserializes_from_host_json() {
        let json = r#"[
            {"type": "stx_transfer_event", "stx_transfer_event": {"sender": "W1", "recipient": "ST1.clearfund", "amount": "1000"}},
            {"type": "some_future_event", "some_future_event": {"x": 1}}
        ]"#;
        let events: Vec<Event> = serde_json::from_str(json).unwrap();
        assert_eq!(events.len(), 2);
        events.expect_stx_transfer_event(1000, "W1", "ST1.clearfund").unwrap();
        assert!(events[1].stx_transfer_event.is_none());
    }
}
