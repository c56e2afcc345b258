//! # Chat Assistant Module
//!
//! Canned-response shopping assistant: an ordered rule table of keyword sets
//! evaluated top-down against the lowercased message. The order is
//! load-bearing ("hi" is a substring of "shipping", so the shipping rule
//! must run first). Deterministic by construction; no inference anywhere.

use crate::catalog::Product;
use serde::Serialize;
use std::cmp::Ordering;

/// Replies mention this many top-rated products
const TOP_PICK_COUNT: usize = 3;

/// Fixed follow-up prompts offered with every reply
const FOLLOW_UPS: [&str; 4] = [
    "Show me trending products",
    "What's your return policy?",
    "Do you have any discounts?",
    "Help me find electronics",
];

/// Assistant reply payload
#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub response: String,
    pub confidence: f32,
    pub suggestions: Vec<&'static str>,
}

/// What a matched rule answers with
enum ReplyKind {
    Canned(&'static str),
    /// Composed from the current top-rated products
    TopPicks,
}

/// Keyword rules, evaluated in order; first containment match wins
const RULES: &[(&[&str], ReplyKind)] = &[
    (
        &["product", "item"],
        ReplyKind::Canned(
            "I'd be happy to help you find products! Could you tell me what type of item \
             you're looking for? We have electronics, clothing, footwear, and accessories \
             available.",
        ),
    ),
    (
        &["price", "cost"],
        ReplyKind::Canned(
            "Our products are competitively priced with frequent discounts. You can use \
             filters on the products page to sort by price range. Would you like me to show \
             you our current deals?",
        ),
    ),
    (
        &["shipping", "delivery"],
        ReplyKind::Canned(
            "We offer free shipping on orders over ₹1000. Standard delivery takes 3-5 \
             business days, and express delivery is available for next-day delivery. Would \
             you like more details about shipping options?",
        ),
    ),
    (
        &["return", "exchange"],
        ReplyKind::Canned(
            "We have a 30-day return policy for all items. Items must be in original \
             condition with tags attached. Returns are free and can be initiated from your \
             account. Need help with a specific return?",
        ),
    ),
    (&["recommend", "suggest"], ReplyKind::TopPicks),
    (
        &["hello", "hi"],
        ReplyKind::Canned(
            "Hello! Great to see you here. I'm here to make your shopping experience smooth \
             and enjoyable. What can I help you find today?",
        ),
    ),
    (
        &["discount", "sale"],
        ReplyKind::Canned(
            "We currently have great discounts on many items! Check out our electronics \
             section for up to 20% off, and clothing with up to 35% off. I can help you find \
             the best deals in your preferred category.",
        ),
    ),
];

const FALLBACK: &str = "I understand you're asking about that. While I'm continuously \
     learning, I can help you with product searches, recommendations, pricing, shipping, \
     and returns. Is there a specific product or topic you'd like to explore?";

/// Answer a shopper message from the rule table
pub fn reply(products: &[Product], message: &str) -> ChatReply {
    let lower = message.to_lowercase();

    let response = RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(_, kind)| match kind {
            ReplyKind::Canned(text) => (*text).to_string(),
            ReplyKind::TopPicks => top_picks_reply(products),
        })
        .unwrap_or_else(|| FALLBACK.to_string());

    ChatReply {
        response,
        confidence: 0.9,
        suggestions: FOLLOW_UPS.to_vec(),
    }
}

fn top_picks_reply(products: &[Product]) -> String {
    let mut top: Vec<&Product> = products.iter().filter(|p| p.rating >= 4.5).collect();
    top.sort_by(|a, b| b.rating.partial_cmp(&a.rating).unwrap_or(Ordering::Equal));

    let names: Vec<&str> = top
        .iter()
        .take(TOP_PICK_COUNT)
        .map(|p| p.name.as_str())
        .collect();

    format!(
        "Based on popularity and ratings, I'd recommend: {}. These are highly rated and \
         trending! What's your budget range?",
        names.join(", ")
    )
}
