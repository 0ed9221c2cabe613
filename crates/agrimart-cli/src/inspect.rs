//! # Inspect Subcommand
//!
//! Read-only views of a snapshot file: order summaries, a single order with
//! its disputes, dispute summaries and catalog stock.

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Args, Subcommand};

use agrimart_core::OrderId;
use agrimart_market::{MarketSnapshot, OrderFile};

/// Arguments for the `agrimart inspect` subcommand.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Market snapshot to read.
    #[arg(long)]
    pub state: PathBuf,

    #[command(subcommand)]
    pub command: InspectCommand,
}

/// Inspect subcommands.
#[derive(Subcommand, Debug)]
pub enum InspectCommand {
    /// One line per order, oldest first.
    Orders {
        /// Only orders in this status (e.g. `delivered`, `partially_shipped`).
        #[arg(long)]
        status: Option<String>,
    },

    /// Print one order and its disputes as JSON.
    Order {
        /// Order identifier, bare or `order:`-prefixed.
        id: OrderId,
    },

    /// One line per dispute.
    Disputes {
        /// Only disputes that are not closed.
        #[arg(long)]
        active: bool,
    },

    /// Available stock per product.
    Stock,
}

/// Execute the inspect subcommand.
pub fn run_inspect(args: &InspectArgs) -> Result<u8> {
    let snapshot = MarketSnapshot::load(&args.state)?;
    let out = match &args.command {
        InspectCommand::Orders { status } => render_orders(&snapshot.orders, status.as_deref()),
        InspectCommand::Order { id } => {
            let Some(file) = snapshot.orders.iter().find(|f| f.order.id == *id) else {
                bail!("order not found: {id}");
            };
            format!("{}\n", serde_json::to_string_pretty(file)?)
        }
        InspectCommand::Disputes { active } => render_disputes(&snapshot.orders, *active),
        InspectCommand::Stock => render_stock(&snapshot),
    };
    print!("{out}");
    Ok(0)
}

fn render_orders(files: &[OrderFile], status: Option<&str>) -> String {
    let selected: Vec<&OrderFile> = files
        .iter()
        .filter(|f| status.map_or(true, |s| f.order.order_status.as_str() == s))
        .collect();
    if selected.is_empty() {
        return "No orders found.\n".to_string();
    }

    let mut out = format!("Orders ({}):\n", selected.len());
    for file in selected {
        let o = &file.order;
        let _ = writeln!(
            out,
            "  {}  {}  payment={}/{}  dispute={}  items={}  total={}  placed={}",
            o.id,
            o.order_status,
            o.payment_method,
            o.payment_status,
            o.dispute_status,
            o.items.len(),
            o.total(),
            o.created_at
        );
    }
    out
}

fn render_disputes(files: &[OrderFile], active_only: bool) -> String {
    let mut lines = Vec::new();
    for file in files {
        for d in &file.disputes {
            if active_only && !d.is_active() {
                continue;
            }
            let answered = if d.seller_response.is_some() {
                "answered"
            } else {
                "unanswered"
            };
            lines.push(format!(
                "  {}  order={}  {}  {}  {}  deadline={}",
                d.id, d.order_id, d.dispute_type, d.state, answered, d.response_deadline
            ));
        }
    }
    if lines.is_empty() {
        return "No disputes found.\n".to_string();
    }
    let mut out = format!("Disputes ({}):\n", lines.len());
    for line in lines {
        out.push_str(&line);
        out.push('\n');
    }
    out
}

fn render_stock(snapshot: &MarketSnapshot) -> String {
    if snapshot.products.is_empty() {
        return "No products found.\n".to_string();
    }
    let mut products: Vec<_> = snapshot.products.iter().collect();
    products.sort_by(|a, b| a.name.cmp(&b.name));
    let mut out = format!("Products ({}):\n", products.len());
    for p in products {
        let _ = writeln!(
            out,
            "  {}  {}  seller={}  available={}  unit_price={}",
            p.id,
            p.name,
            p.seller.user_id(),
            p.available,
            p.unit_price
        );
    }
    out
}
