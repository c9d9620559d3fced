//! Simple and cumulative returns

use crate::data::bar::finite;

/// `C[i] / C[i-1] - 1`; undefined on the first bar and around gaps.
pub fn calculate_returns(closes: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(closes.len());
    let mut prev: Option<f64> = None;
    for &close in closes {
        let ret = match (prev, close) {
            (Some(p), Some(c)) => finite(c / p - 1.0),
            _ => None,
        };
        out.push(ret);
        prev = close;
    }
    out
}

/// Compounded return `Π(1 + r) - 1` over the defined returns so far.
///
/// A missing return leaves its own cell undefined but does not reset the
/// product, so `CumReturn[0]` is always undefined.
pub fn calculate_cum_returns(returns: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut growth = 1.0;
    returns
        .iter()
        .map(|ret| {
            ret.map(|r| {
                growth *= 1.0 + r;
                growth - 1.0
            })
        })
        .collect()
}
