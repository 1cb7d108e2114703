//! Wire command names for the Poloniex REST API.
//!
//! Commands are named constants and order placement goes through an explicit
//! `(side, margin) -> command` table; nothing builds command names at
//! runtime.

use crate::domain::Side;

// Public API.
pub const RETURN_TICKER: &str = "returnTicker";
pub const RETURN_ORDER_BOOK: &str = "returnOrderBook";
pub const RETURN_TRADE_HISTORY: &str = "returnTradeHistory";
pub const RETURN_CHART_DATA: &str = "returnChartData";
pub const RETURN_CURRENCIES: &str = "returnCurrencies";
pub const RETURN_LOAN_ORDERS: &str = "returnLoanOrders";

// Trading API: balances.
pub const RETURN_COMPLETE_BALANCES: &str = "returnCompleteBalances";
pub const RETURN_AVAILABLE_ACCOUNT_BALANCES: &str = "returnAvailableAccountBalances";
pub const TRANSFER_BALANCE: &str = "transferBalance";
pub const RETURN_FEE_INFO: &str = "returnFeeInfo";

// Trading API: orders.
pub const RETURN_OPEN_ORDERS: &str = "returnOpenOrders";
pub const RETURN_ORDER_TRADES: &str = "returnOrderTrades";
pub const MOVE_ORDER: &str = "moveOrder";
pub const CANCEL_ORDER: &str = "cancelOrder";
pub const CANCEL_ALL_ORDERS: &str = "cancelAllOrders";

// Trading API: funding.
pub const RETURN_DEPOSIT_ADDRESSES: &str = "returnDepositAddresses";
pub const GENERATE_NEW_ADDRESS: &str = "generateNewAddress";
pub const WITHDRAW: &str = "withdraw";
pub const RETURN_DEPOSITS_WITHDRAWALS: &str = "returnDepositsWithdrawals";

// Trading API: lending.
pub const RETURN_OPEN_LOAN_OFFERS: &str = "returnOpenLoanOffers";
pub const RETURN_ACTIVE_LOANS: &str = "returnActiveLoans";
pub const RETURN_LENDING_HISTORY: &str = "returnLendingHistory";
pub const CREATE_LOAN_OFFER: &str = "createLoanOffer";
pub const CANCEL_LOAN_OFFER: &str = "cancelLoanOffer";

/// Order placement command for a side, resolved from a fixed table.
#[must_use]
pub const fn order_command(side: Side, margin: bool) -> &'static str {
    match (side, margin) {
        (Side::Buy, false) => "buy",
        (Side::Sell, false) => "sell",
        (Side::Buy, true) => "marginBuy",
        (Side::Sell, true) => "marginSell",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_command_table_is_exhaustive() {
        assert_eq!(order_command(Side::Buy, false), "buy");
        assert_eq!(order_command(Side::Sell, false), "sell");
        assert_eq!(order_command(Side::Buy, true), "marginBuy");
        assert_eq!(order_command(Side::Sell, true), "marginSell");
    }
}
