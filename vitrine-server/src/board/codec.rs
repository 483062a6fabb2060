//! Board codec
//!
//! Pure render/parse pair for the price-board message. The board is a
//! single embed with one field per catalog item:
//!
//! ```text
//! name:  {emoji} {NAME}
//! value: **Preço:** R$7.50
//!        **Estoque:** 202        (or ESGOTADO when sold out)
//! ```
//!
//! `parse` reads the same grammar back, tolerating hand edits: emphasis
//! markers are stripped, the decimal separator may be a comma, and the
//! quantity token is matched case-insensitively. Nothing here touches the
//! network — the transport layer feeds fields in and ships payloads out.

use crate::db::models::{StockItem, StockPatch};
use crate::discord::{Embed, EmbedField, EmbedFooter, WebhookPayload};
use regex::Regex;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::LazyLock;

const BOARD_USERNAME: &str = "VITRINE [PREÇOS]";
const BOARD_TITLE: &str = "🛒 VITRINE STORE | TABELA DE PREÇOS";
const BOARD_FOOTER: &str = "🛒 VITRINE STORE";
const BOARD_COLOR: u32 = 16753920;

/// Textual token standing in for a zero quantity
pub const SOLD_OUT: &str = "ESGOTADO";

static QUANTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Estoque:\s*([0-9]+|ESGOTADO)").expect("quantity pattern"));

static PRICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Preço:\s*R\$([\d.,]+)").expect("price pattern"));

/// Render the catalog into the canonical board payload
///
/// Field order follows input order; callers pass a name-ascending list.
pub fn render_board(items: &[StockItem]) -> WebhookPayload {
    WebhookPayload {
        username: Some(BOARD_USERNAME.to_string()),
        embeds: vec![Embed {
            title: Some(BOARD_TITLE.to_string()),
            color: Some(BOARD_COLOR),
            fields: items.iter().map(render_field).collect(),
            footer: Some(EmbedFooter {
                text: BOARD_FOOTER.to_string(),
            }),
            ..Default::default()
        }],
        ..Default::default()
    }
}

fn render_field(item: &StockItem) -> EmbedField {
    let stock = if item.quantity > 0 {
        item.quantity.to_string()
    } else {
        SOLD_OUT.to_string()
    };
    EmbedField::inline(
        format!("{} {}", item.emoji, item.name),
        format!("**Preço:** R${:.2}\n**Estoque:** {}", item.price, stock),
    )
}

/// Parse board fields back into partial updates keyed by item id
///
/// A field belongs to the first known item whose name is contained in the
/// field name (order-dependent when names overlap — intentionally so).
/// Fields matching no item, and values yielding neither a quantity nor a
/// price, contribute nothing; untouched items keep their local state.
pub fn parse_board(
    fields: &[EmbedField],
    known_items: &[StockItem],
) -> HashMap<String, StockPatch> {
    let mut updates = HashMap::new();

    for field in fields {
        let Some(item) = known_items.iter().find(|i| field.name.contains(&i.name)) else {
            continue;
        };

        let cleaned = field.value.replace("**", "");
        let patch = StockPatch {
            quantity: parse_quantity(&cleaned),
            price: parse_price(&cleaned),
        };
        if !patch.is_empty() {
            updates.insert(item.id.clone(), patch);
        }
    }

    updates
}

fn parse_quantity(value: &str) -> Option<i64> {
    let token = QUANTITY_RE.captures(value)?.get(1)?.as_str();
    if token.eq_ignore_ascii_case(SOLD_OUT) {
        Some(0)
    } else {
        token.parse().ok()
    }
}

fn parse_price(value: &str) -> Option<Decimal> {
    let raw = PRICE_RE.captures(value)?.get(1)?.as_str();
    Decimal::from_str(&raw.replace(',', ".")).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_item(id: &str, name: &str, price: &str, quantity: i64) -> StockItem {
        StockItem {
            id: id.to_string(),
            name: name.to_string(),
            emoji: "🍅".to_string(),
            price: Decimal::from_str(price).unwrap(),
            quantity,
            max: 100,
        }
    }

    fn make_field(name: &str, value: &str) -> EmbedField {
        EmbedField::inline(name, value)
    }

    #[test]
    fn test_render_field_format() {
        let payload = render_board(&[make_item("TOMATRIO", "TOMATRIO", "7.5", 202)]);
        let field = &payload.embeds[0].fields[0];
        assert_eq!(field.name, "🍅 TOMATRIO");
        assert_eq!(field.value, "**Preço:** R$7.50\n**Estoque:** 202");
        assert!(field.inline);
    }

    #[test]
    fn test_render_zero_quantity_as_sold_out() {
        let payload = render_board(&[make_item("MANGO", "MANGO", "0.70", 0)]);
        assert_eq!(
            payload.embeds[0].fields[0].value,
            "**Preço:** R$0.70\n**Estoque:** ESGOTADO"
        );
    }

    #[test]
    fn test_render_board_envelope() {
        let payload = render_board(&[]);
        assert_eq!(payload.username.as_deref(), Some(BOARD_USERNAME));
        let embed = &payload.embeds[0];
        assert_eq!(embed.title.as_deref(), Some(BOARD_TITLE));
        assert_eq!(embed.color, Some(BOARD_COLOR));
        assert_eq!(embed.footer.as_ref().unwrap().text, BOARD_FOOTER);
    }

    #[test]
    fn test_round_trip_is_idempotent() {
        let items = vec![
            make_item("TOMATRIO", "TOMATRIO", "0.50", 202),
            make_item("MANGO", "MANGO", "7.50", 0),
        ];
        let payload = render_board(&items);
        let updates = parse_board(&payload.embeds[0].fields, &items);

        assert_eq!(updates.len(), 2);
        for item in &items {
            let patch = &updates[&item.id];
            assert_eq!(patch.quantity, Some(item.quantity));
            assert_eq!(patch.price, Some(item.price));
        }
    }

    #[test]
    fn test_parse_sold_out_token_case_insensitive() {
        let items = vec![make_item("MANGO", "MANGO", "0.70", 50)];
        let fields = [make_field("🥭 MANGO", "Preço: R$0.70\nEstoque: esgotado")];
        let updates = parse_board(&fields, &items);
        assert_eq!(updates["MANGO"].quantity, Some(0));
    }

    #[test]
    fn test_parse_comma_decimal_separator() {
        let items = vec![make_item("PLANTA", "PLANTA", "1.00", 5)];
        let fields = [make_field("🌱 PLANTA", "**Preço:** R$7,50\n**Estoque:** 5")];
        let updates = parse_board(&fields, &items);
        assert_eq!(updates["PLANTA"].price, Some(Decimal::from_str("7.5").unwrap()));
    }

    #[test]
    fn test_parse_unknown_field_contributes_nothing() {
        let items = vec![make_item("MANGO", "MANGO", "0.70", 50)];
        let fields = [make_field("👻 GHOST FRUIT", "Preço: R$9.99\nEstoque: 3")];
        assert!(parse_board(&fields, &items).is_empty());
    }

    #[test]
    fn test_parse_unparseable_value_contributes_nothing() {
        let items = vec![make_item("MANGO", "MANGO", "0.70", 50)];
        let fields = [make_field("🥭 MANGO", "muito barato, quase de graça")];
        assert!(parse_board(&fields, &items).is_empty());
    }

    #[test]
    fn test_parse_quantity_only() {
        let items = vec![make_item("MANGO", "MANGO", "0.70", 50)];
        let fields = [make_field("🥭 MANGO", "Estoque: 12")];
        let updates = parse_board(&fields, &items);
        assert_eq!(updates["MANGO"].quantity, Some(12));
        assert_eq!(updates["MANGO"].price, None);
    }

    #[test]
    fn test_parse_first_substring_match_wins() {
        // Overlapping names are resolved by known-item order, nothing smarter
        let items = vec![
            make_item("MAN", "MAN", "1.00", 1),
            make_item("MANGO", "MANGO", "2.00", 2),
        ];
        let fields = [make_field("🥭 MANGO", "Estoque: 9")];
        let updates = parse_board(&fields, &items);
        assert_eq!(updates.len(), 1);
        assert_eq!(updates["MAN"].quantity, Some(9));
    }

    #[test]
    fn test_parse_strips_emphasis_markers() {
        let items = vec![make_item("MANGO", "MANGO", "0.70", 50)];
        let fields = [make_field("🥭 MANGO", "**Preço:** R$0,80\n**Estoque:** ESGOTADO")];
        let updates = parse_board(&fields, &items);
        assert_eq!(updates["MANGO"].quantity, Some(0));
        assert_eq!(updates["MANGO"].price, Some(Decimal::from_str("0.80").unwrap()));
    }
}
