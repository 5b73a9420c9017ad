use crate::loader::SalesTable;
use crate::records::ProductId;

/// One product in the target order. Index 0 is the best seller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedMove {
    pub product_id: ProductId,
    pub title: String,
    pub total_sales: i64,
}

/// Orders identifiable products by total sales, highest first.
///
/// Products without an identifier are dropped. The sort is stable, so equal
/// totals keep the order in which their titles first appeared in the input.
#[must_use]
pub fn build_ranking(table: &SalesTable) -> Vec<RankedMove> {
    let mut ranked: Vec<RankedMove> = table
        .products()
        .iter()
        .filter_map(|p| {
            p.product_id.as_ref().map(|id| RankedMove {
                product_id: id.clone(),
                title: p.product_title.clone(),
                total_sales: p.total_sales,
            })
        })
        .collect();
    ranked.sort_by(|a, b| b.total_sales.cmp(&a.total_sales));
    ranked
}
