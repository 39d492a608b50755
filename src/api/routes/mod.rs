pub mod history;
pub mod ledger;
pub mod matches;

#[cfg(test)]
pub(crate) mod test_support;
