// Tool Catalog
//
// One row per payment API operation. The executor turns a row plus the
// caller's arguments into a signed HTTP request, so adding an operation
// means adding a row here and nothing else.

use reqwest::Method;
use serde_json::{json, Map, Value};

/// JSON type expected for a tool argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgType {
    String,
    Integer,
    Number,
    Boolean,
    Object,
    Array,
}

impl ArgType {
    /// JSON Schema type name.
    pub fn schema_name(self) -> &'static str {
        match self {
            ArgType::String => "string",
            ArgType::Integer => "integer",
            ArgType::Number => "number",
            ArgType::Boolean => "boolean",
            ArgType::Object => "object",
            ArgType::Array => "array",
        }
    }

    pub fn matches(self, value: &Value) -> bool {
        match self {
            ArgType::String => value.is_string(),
            ArgType::Integer => value.is_i64() || value.is_u64(),
            ArgType::Number => value.is_number(),
            ArgType::Boolean => value.is_boolean(),
            ArgType::Object => value.is_object(),
            ArgType::Array => value.is_array(),
        }
    }
}

/// Where an argument ends up in the HTTP request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgLocation {
    /// Substituted into a `{name}` placeholder of the path template.
    Path,
    /// Sent as a query string parameter.
    Query,
    /// Sent as a field of the JSON body.
    Body,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpVerb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpVerb {
    pub fn method(self) -> Method {
        match self {
            HttpVerb::Get => Method::GET,
            HttpVerb::Post => Method::POST,
            HttpVerb::Put => Method::PUT,
            HttpVerb::Patch => Method::PATCH,
            HttpVerb::Delete => Method::DELETE,
        }
    }

    /// Whether requests with this verb carry a JSON body.
    pub fn has_body(self) -> bool {
        matches!(self, HttpVerb::Post | HttpVerb::Put | HttpVerb::Patch)
    }
}

/// One argument of a tool.
#[derive(Debug, Clone, Copy)]
pub struct ToolArg {
    /// Argument name as seen by the agent.
    pub name: &'static str,
    /// Field name used by the remote API (query key or body key).
    pub field: &'static str,
    pub kind: ArgType,
    pub location: ArgLocation,
    pub required: bool,
    pub description: &'static str,
}

impl ToolArg {
    pub const fn required(
        name: &'static str,
        field: &'static str,
        kind: ArgType,
        location: ArgLocation,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            field,
            kind,
            location,
            required: true,
            description,
        }
    }

    pub const fn optional(
        name: &'static str,
        field: &'static str,
        kind: ArgType,
        location: ArgLocation,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            field,
            kind,
            location,
            required: false,
            description,
        }
    }
}

/// Declarative description of one API operation exposed as a tool.
#[derive(Debug, Clone, Copy)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub verb: HttpVerb,
    /// Path relative to the API base URL, with `{arg}` placeholders.
    pub path: &'static str,
    pub args: &'static [ToolArg],
    /// Constant string fields merged into the body.
    pub fixed_body: &'static [(&'static str, &'static str)],
    /// When set, body fields are nested under this key.
    pub body_wrapper: Option<&'static str>,
}

impl ToolSpec {
    /// MCP tool descriptor: `{ name, description, inputSchema }`.
    pub fn descriptor(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for arg in self.args {
            properties.insert(
                arg.name.to_string(),
                json!({"type": arg.kind.schema_name(), "description": arg.description}),
            );
            if arg.required {
                required.push(Value::String(arg.name.to_string()));
            }
        }

        let mut schema = json!({"type": "object", "properties": properties});
        if !required.is_empty() {
            schema["required"] = Value::Array(required);
        }

        json!({
            "name": self.name,
            "description": self.description,
            "inputSchema": schema
        })
    }
}

use self::ArgLocation::{Body, Path, Query};
use self::ArgType::{Integer, String as Str};

const PAGE_ARGS: [ToolArg; 2] = [
    ToolArg::optional("page", "page", Integer, Query, "Page number, starting at 1"),
    ToolArg::optional("page_size", "pageSize", Integer, Query, "Number of items per page"),
];

/// Every operation exposed as a tool.
pub static TOOLS: &[ToolSpec] = &[
    // Transactions
    ToolSpec {
        name: "create_transaction",
        description: "Create a payment transaction and return its payment URL",
        verb: HttpVerb::Post,
        path: "/transactions",
        args: &[
            ToolArg::required("amount", "amount", Str, Body, "Amount as a decimal string, e.g. \"10.00\""),
            ToolArg::required("currency", "currency", Str, Body, "ISO 4217 currency code"),
            ToolArg::required("description", "description", Str, Body, "Description shown to the payer"),
            ToolArg::optional("order_id", "orderId", Str, Body, "Merchant order reference"),
            ToolArg::optional("customer_email", "customerEmail", Str, Body, "Payer e-mail address"),
            ToolArg::optional("return_url", "returnUrl", Str, Body, "URL the payer is sent to afterwards"),
            ToolArg::optional("notification_url", "notificationUrl", Str, Body, "URL receiving status notifications"),
        ],
        fixed_body: &[],
        body_wrapper: Some("trData"),
    },
    ToolSpec {
        name: "get_transaction",
        description: "Get the details and status of a transaction",
        verb: HttpVerb::Get,
        path: "/transactions/{transaction_id}",
        args: &[ToolArg::required("transaction_id", "transactionId", Str, Path, "Transaction identifier")],
        fixed_body: &[],
        body_wrapper: None,
    },
    ToolSpec {
        name: "list_transactions",
        description: "List transactions, optionally filtered by date range and status",
        verb: HttpVerb::Get,
        path: "/transactions",
        args: &[
            ToolArg::optional("from_date", "fromDate", Str, Query, "Start date (YYYY-MM-DD)"),
            ToolArg::optional("to_date", "toDate", Str, Query, "End date (YYYY-MM-DD)"),
            ToolArg::optional("status", "status", Str, Query, "Transaction status filter"),
            PAGE_ARGS[0],
            PAGE_ARGS[1],
        ],
        fixed_body: &[],
        body_wrapper: None,
    },
    ToolSpec {
        name: "refund_transaction",
        description: "Refund a transaction in full or in part",
        verb: HttpVerb::Post,
        path: "/transactions/{transaction_id}/refunds",
        args: &[
            ToolArg::required("transaction_id", "transactionId", Str, Path, "Transaction identifier"),
            ToolArg::optional("amount", "amount", Str, Body, "Amount to refund; full refund when omitted"),
            ToolArg::optional("reason", "reason", Str, Body, "Reason for the refund"),
        ],
        fixed_body: &[],
        body_wrapper: None,
    },
    // Products
    ToolSpec {
        name: "create_product",
        description: "Create a product that can be sold through deep links",
        verb: HttpVerb::Post,
        path: "/products",
        args: &[
            ToolArg::required("name", "name", Str, Body, "Product name"),
            ToolArg::required("price", "price", Str, Body, "Price as a decimal string"),
            ToolArg::required("currency", "currency", Str, Body, "ISO 4217 currency code"),
            ToolArg::optional("description", "description", Str, Body, "Product description"),
        ],
        fixed_body: &[],
        body_wrapper: None,
    },
    ToolSpec {
        name: "get_product",
        description: "Get a product by identifier",
        verb: HttpVerb::Get,
        path: "/products/{product_id}",
        args: &[ToolArg::required("product_id", "productId", Str, Path, "Product identifier")],
        fixed_body: &[],
        body_wrapper: None,
    },
    ToolSpec {
        name: "list_products",
        description: "List products",
        verb: HttpVerb::Get,
        path: "/products",
        args: &PAGE_ARGS,
        fixed_body: &[],
        body_wrapper: None,
    },
    // Reports
    ToolSpec {
        name: "generate_report",
        description: "Request generation of a settlement or transaction report",
        verb: HttpVerb::Post,
        path: "/reports",
        args: &[
            ToolArg::required("report_type", "reportType", Str, Body, "Report type, e.g. transactions or settlements"),
            ToolArg::required("from_date", "fromDate", Str, Body, "Start date (YYYY-MM-DD)"),
            ToolArg::required("to_date", "toDate", Str, Body, "End date (YYYY-MM-DD)"),
            ToolArg::optional("format", "format", Str, Body, "Output format, e.g. csv or json"),
        ],
        fixed_body: &[],
        body_wrapper: None,
    },
    ToolSpec {
        name: "get_report",
        description: "Get the status or content of a generated report",
        verb: HttpVerb::Get,
        path: "/reports/{report_id}",
        args: &[ToolArg::required("report_id", "reportId", Str, Path, "Report identifier")],
        fixed_body: &[],
        body_wrapper: None,
    },
    // Deep links
    ToolSpec {
        name: "create_deep_link",
        description: "Create a shareable payment deep link",
        verb: HttpVerb::Post,
        path: "/deeplinks",
        args: &[
            ToolArg::required("amount", "amount", Str, Body, "Amount as a decimal string"),
            ToolArg::required("currency", "currency", Str, Body, "ISO 4217 currency code"),
            ToolArg::required("title", "title", Str, Body, "Title shown on the payment page"),
            ToolArg::optional("description", "description", Str, Body, "Longer description"),
            ToolArg::optional("product_id", "productId", Str, Body, "Product the link sells"),
            ToolArg::optional("expires_at", "expiresAt", Str, Body, "Expiry timestamp (RFC 3339)"),
        ],
        fixed_body: &[],
        body_wrapper: None,
    },
    // OAuth2
    ToolSpec {
        name: "exchange_oauth_code",
        description: "Exchange an OAuth2 authorization code for access and refresh tokens",
        verb: HttpVerb::Post,
        path: "/oauth2/token",
        args: &[
            ToolArg::required("code", "code", Str, Body, "Authorization code from the redirect"),
            ToolArg::required("redirect_uri", "redirect_uri", Str, Body, "Redirect URI used in the authorization request"),
            ToolArg::optional("code_verifier", "code_verifier", Str, Body, "PKCE code verifier"),
        ],
        fixed_body: &[("grant_type", "authorization_code")],
        body_wrapper: None,
    },
    ToolSpec {
        name: "refresh_oauth_token",
        description: "Obtain a new OAuth2 access token from a refresh token",
        verb: HttpVerb::Post,
        path: "/oauth2/token",
        args: &[ToolArg::required("refresh_token", "refresh_token", Str, Body, "Refresh token")],
        fixed_body: &[("grant_type", "refresh_token")],
        body_wrapper: None,
    },
];

/// Look up a tool by name.
pub fn find(name: &str) -> Option<&'static ToolSpec> {
    TOOLS.iter().find(|tool| tool.name == name)
}

/// Descriptors for every tool, as returned by an MCP `tools/list`.
pub fn descriptors() -> Vec<Value> {
    TOOLS.iter().map(ToolSpec::descriptor).collect()
}
