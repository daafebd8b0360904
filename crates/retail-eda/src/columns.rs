//! Column names of the retail transaction log.

pub const INVOICE_NO: &str = "InvoiceNo";
pub const STOCK_CODE: &str = "StockCode";
pub const DESCRIPTION: &str = "Description";
pub const QUANTITY: &str = "Quantity";
pub const INVOICE_DATE: &str = "InvoiceDate";
pub const UNIT_PRICE: &str = "UnitPrice";
pub const CUSTOMER_ID: &str = "CustomerID";
pub const COUNTRY: &str = "Country";

// Derived by the cleaner.
pub const TOTAL_SALES: &str = "TotalSales";
pub const MONTH: &str = "Month";
pub const DAY_OF_WEEK: &str = "DayOfWeek";

/// Columns the loader insists on.
pub const REQUIRED: [&str; 6] = [
    CUSTOMER_ID,
    QUANTITY,
    UNIT_PRICE,
    INVOICE_DATE,
    COUNTRY,
    DESCRIPTION,
];

/// Columns that must hold numbers.
pub const NUMERIC: [&str; 2] = [QUANTITY, UNIT_PRICE];

/// Columns appended after cleaning.
pub const DERIVED: [&str; 3] = [TOTAL_SALES, MONTH, DAY_OF_WEEK];
