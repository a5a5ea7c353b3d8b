//! XPath evaluation for [`EtreeStrategy::select`](crate::EtreeStrategy::select)
//!
//! Expressions run through xee over its own xot copy of the document. The
//! selected nodes are reported as pre-order element positions, which index
//! straight into [`Element::iter`](crate::Element::iter) of a tree parsed
//! from the same text.

use xee_xpath::{Documents, Queries, Query};
use xml_search_traits::error::{Error, Result};

/// Positions of the elements `expr` selects, in document order.
///
/// The document element is position 0. The expression is evaluated with the
/// document node as context item, so both `/catalog/book` and `//title`
/// work. Anything that is not an element in the result is an error.
pub fn select_positions(xml: &str, expr: &str) -> Result<Vec<usize>> {
    let mut documents = Documents::new();
    let handle = documents
        .add_string_without_uri(xml)
        .map_err(|e| Error::malformed(format!("{:?}", e)))?;

    let queries = Queries::default();
    let query = queries
        .many(expr, |_, item| Ok(item.to_node()?))
        .map_err(|e| Error::invalid_input(format!("invalid XPath {:?}: {:?}", expr, e)))?;
    let nodes = query
        .execute(&mut documents, handle)
        .map_err(|e| Error::invalid_input(format!("XPath {:?} failed: {:?}", expr, e)))?;

    let document = documents
        .document_node(handle)
        .ok_or_else(|| Error::malformed("document node missing after load"))?;
    let xot = documents.xot();
    let order: Vec<_> = xot
        .descendants(document)
        .filter(|node| xot.is_element(*node))
        .collect();

    nodes
        .into_iter()
        .map(|node| {
            order.iter().position(|candidate| *candidate == node).ok_or_else(|| {
                Error::invalid_input(format!("XPath {:?} selects nodes other than elements", expr))
            })
        })
        .collect()
}
