//! Decoding of Namecheap XML responses.
//!
//! Namecheap answers every command with an `<ApiResponse Status="...">`
//! envelope. `ApiResponse::decode` is the only way in: it either yields a view
//! over a successful response or the registrar's error text.

use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::error::RegistrarError;

pub const UNKNOWN_ERROR: &str = "Unknown error occurred";

fn error_patterns() -> &'static [Regex; 3] {
    static PATTERNS: OnceLock<[Regex; 3]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            Regex::new(r#"<Error Number="\d+">([^<]*)</Error>"#).expect("static regex"),
            Regex::new(r"<Error>([^<]*)</Error>").expect("static regex"),
            Regex::new(r"<Message>([^<]*)</Message>").expect("static regex"),
        ]
    })
}

fn transaction_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r#"TransactionID="(\d+)""#).expect("static regex"))
}

/// Registrar error text, tried in a fixed order: numbered `<Error>`, bare
/// `<Error>`, then `<Message>`.
pub fn error_message(xml: &str) -> String {
    error_patterns()
        .iter()
        .find_map(|re| re.captures(xml))
        .and_then(|c| c.get(1))
        .map(|m| unescape(m.as_str().trim()))
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| UNKNOWN_ERROR.to_string())
}

/// Price of `tld` from a `users.getPricing` body: the first `Price` attribute
/// following the product's `Name`.
pub fn product_price(xml: &str, tld: &str) -> Option<Decimal> {
    let pattern = format!(r#"(?s)Name="{}".*?\sPrice="([^"]*)""#, regex::escape(tld));
    let re = Regex::new(&pattern).ok()?;
    let raw = re.captures(xml)?.get(1)?.as_str();
    Decimal::from_str(raw.trim()).ok()
}

fn unescape(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

pub struct ApiResponse<'a> {
    xml: &'a str,
}

impl<'a> ApiResponse<'a> {
    pub fn decode(xml: &'a str) -> Result<Self, RegistrarError> {
        let status = Self::elements_in(xml, "ApiResponse")
            .next()
            .and_then(|root| root.attr("Status"));
        match status {
            Some(s) if s.eq_ignore_ascii_case("OK") => Ok(Self { xml }),
            _ => Err(RegistrarError::ProviderParse(error_message(xml))),
        }
    }

    pub fn elements(&self, tag: &'a str) -> impl Iterator<Item = Element<'a>> + 'a {
        Self::elements_in(self.xml, tag)
    }

    /// First `<tag>` whose `attr` equals `value` (case-insensitive).
    pub fn find(&self, tag: &'a str, attr: &str, value: &str) -> Option<Element<'a>> {
        self.elements(tag)
            .find(|el| el.attr(attr).is_some_and(|v| v.eq_ignore_ascii_case(value)))
    }

    pub fn transaction_id(&self) -> Option<String> {
        transaction_pattern()
            .captures(self.xml)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    }

    fn elements_in(xml: &'a str, tag: &'a str) -> impl Iterator<Item = Element<'a>> + 'a {
        let open = format!("<{}", tag);
        let mut search_from = 0;
        std::iter::from_fn(move || loop {
            let start = search_from + xml[search_from..].find(&open)?;
            let after_name = start + open.len();
            // `<Domain` must not match `<DomainCheckResult`.
            let boundary = xml[after_name..].chars().next()?;
            if !(boundary.is_whitespace() || boundary == '>' || boundary == '/') {
                search_from = after_name;
                continue;
            }
            let end = after_name + xml[after_name..].find('>')? + 1;
            search_from = end;
            return Some(Element {
                fragment: &xml[start..end],
            });
        })
    }
}

/// The opening tag of one XML element.
#[derive(Debug, Clone, Copy)]
pub struct Element<'a> {
    fragment: &'a str,
}

impl<'a> Element<'a> {
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        let needle = format!("{}=\"", name);
        let mut from = 0;
        while let Some(pos) = self.fragment[from..].find(&needle) {
            let at = from + pos;
            let preceded_by_space = self.fragment[..at]
                .chars()
                .last()
                .is_some_and(char::is_whitespace);
            let val_start = at + needle.len();
            if preceded_by_space {
                let end = self.fragment[val_start..].find('"')?;
                return Some(&self.fragment[val_start..val_start + end]);
            }
            from = val_start;
        }
        None
    }

    pub fn flag(&self, name: &str) -> bool {
        self.attr(name).is_some_and(|v| v.eq_ignore_ascii_case("true"))
    }

    pub fn decimal(&self, name: &str) -> Option<Decimal> {
        self.attr(name).and_then(|v| Decimal::from_str(v.trim()).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHECK_OK: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<ApiResponse Status="OK" xmlns="http://api.namecheap.com/xml.response">
  <Errors />
  <CommandResponse Type="namecheap.domains.check">
    <DomainCheckResult Domain="goldcasino.com" Available="false" IsPremiumName="false" PremiumRegistrationPrice="0" />
    <DomainCheckResult Domain="goldcasino.vip" Available="true" IsPremiumName="true" PremiumRegistrationPrice="88.50" />
  </CommandResponse>
</ApiResponse>"#;

    #[test]
    fn decode_finds_elements_by_attribute() {
        let resp = ApiResponse::decode(CHECK_OK).expect("ok response");
        let vip = resp
            .find("DomainCheckResult", "Domain", "GoldCasino.vip")
            .expect("vip result");
        assert!(vip.flag("Available"));
        assert!(vip.flag("IsPremiumName"));
        assert_eq!(vip.decimal("PremiumRegistrationPrice"), Some(Decimal::new(8850, 2)));
        let com = resp
            .find("DomainCheckResult", "Domain", "goldcasino.com")
            .expect("com result");
        assert!(!com.flag("Available"));
        assert!(resp.find("DomainCheckResult", "Domain", "goldcasino.net").is_none());
    }

    #[test]
    fn error_precedence_prefers_numbered_error() {
        let xml = r#"<ApiResponse Status="ERROR"><Errors><Error>plain</Error><Error Number="2030280">TLD is not supported</Error></Errors><Message>msg</Message></ApiResponse>"#;
        assert_eq!(error_message(xml), "TLD is not supported");
        let err = ApiResponse::decode(xml).err().expect("error response");
        assert_eq!(err, RegistrarError::ProviderParse("TLD is not supported".into()));
    }

    #[test]
    fn error_precedence_falls_through() {
        assert_eq!(
            error_message(r#"<ApiResponse Status="ERROR"><Error>Bad &amp; wrong</Error><Message>m</Message></ApiResponse>"#),
            "Bad & wrong"
        );
        assert_eq!(
            error_message(r#"<ApiResponse Status="ERROR"><Message>Try later</Message></ApiResponse>"#),
            "Try later"
        );
        assert_eq!(error_message("<html>gateway</html>"), UNKNOWN_ERROR);
    }

    #[test]
    fn attr_does_not_match_suffix_names() {
        let xml = r#"<ApiResponse Status="OK"><Price RegularPrice="10.98" Price="8.88" /></ApiResponse>"#;
        let resp = ApiResponse::decode(xml).expect("ok");
        let price = resp.elements("Price").next().expect("price element");
        assert_eq!(price.attr("Price"), Some("8.88"));
        assert_eq!(price.attr("RegularPrice"), Some("10.98"));
    }

    #[test]
    fn product_price_is_anchored_to_tld() {
        let xml = r#"<ApiResponse Status="OK"><CommandResponse>
            <ProductType Name="domains"><ProductCategory Name="register">
              <Product Name="co"><Price Duration="1" DurationType="YEAR" Price="11.48" RegularPrice="12.98" /></Product>
              <Product Name="com"><Price Duration="1" DurationType="YEAR" Price="10.28" RegularPrice="10.98" /></Product>
            </ProductCategory></ProductType></CommandResponse></ApiResponse>"#;
        assert_eq!(product_price(xml, "com"), Some(Decimal::new(1028, 2)));
        assert_eq!(product_price(xml, "co"), Some(Decimal::new(1148, 2)));
        assert_eq!(product_price(xml, "net"), None);
    }

    #[test]
    fn transaction_id_is_numeric() {
        let xml = r#"<ApiResponse Status="OK"><DomainCreateResult Domain="a.com" Registered="true" TransactionID="1234567" /></ApiResponse>"#;
        let resp = ApiResponse::decode(xml).expect("ok");
        assert_eq!(resp.transaction_id().as_deref(), Some("1234567"));
    }
}
