use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Label {
    Number,
    Date,
    Due,
    Time,
    PaymentDate,
    PaymentMethod,
    Period,
    PoNumber,
    From,
    To,
    Product,
    Price,
    TotalQty,
    Qty,
    PriceOt,
    QuantityOt,
    Total,
    Page,
    PageOf,
    GrandTotal,
}

impl Label {
    pub const ALL: [Label; 20] = [
        Label::Number,
        Label::Date,
        Label::Due,
        Label::Time,
        Label::PaymentDate,
        Label::PaymentMethod,
        Label::Period,
        Label::PoNumber,
        Label::From,
        Label::To,
        Label::Product,
        Label::Price,
        Label::TotalQty,
        Label::Qty,
        Label::PriceOt,
        Label::QuantityOt,
        Label::Total,
        Label::Page,
        Label::PageOf,
        Label::GrandTotal,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Label::Number => "number",
            Label::Date => "date",
            Label::Due => "due",
            Label::Time => "time",
            Label::PaymentDate => "payment_date",
            Label::PaymentMethod => "payment_method",
            Label::Period => "period",
            Label::PoNumber => "po_number",
            Label::From => "from",
            Label::To => "to",
            Label::Product => "product",
            Label::Price => "price",
            Label::TotalQty => "total_qty",
            Label::Qty => "qty",
            Label::PriceOt => "price_ot",
            Label::QuantityOt => "quantity_ot",
            Label::Total => "total",
            Label::Page => "page",
            Label::PageOf => "page_of",
            Label::GrandTotal => "grand_total",
        }
    }

    pub fn from_key(key: &str) -> Option<Label> {
        Label::ALL.into_iter().find(|l| l.key() == key)
    }
}

// Rows follow the order of `Label::ALL`.
const EN: [&str; 20] = [
    "Number", "Date", "Due Date", "Time", "Payment Date", "Payment Method", "Period",
    "PO Number", "Our information", "Billing to", "Product", "Price", "Total Qty", "Qty",
    "Price OT", "Qty OT", "Total", "Page", "of", "Grand Total",
];
const NL: [&str; 20] = [
    "Nummer", "Datum", "Vervaldatum", "Tijd", "Betaaldatum", "Betaalmethode", "Periode",
    "PO Nummer", "Onze gegevens", "Factuur aan", "Product", "Prijs", "Totaal aantal", "Aantal",
    "Prijs OT", "Aantal OT", "Totaal", "Pagina", "van", "Eindtotaal",
];
const FR: [&str; 20] = [
    "Numero", "Date", "Echeance", "Heure", "Date de paiement", "Mode de paiement", "Periode",
    "Bon de commande", "Nos informations", "Facture a", "Produit", "Prix", "Qte totale", "Qte",
    "Prix HS", "Qte HS", "Total", "Page", "sur", "Total general",
];
const DE: [&str; 20] = [
    "Nummer", "Datum", "Faellig", "Uhrzeit", "Zahlungsdatum", "Zahlungsart", "Zeitraum",
    "Bestellnummer", "Unsere Angaben", "Rechnung an", "Produkt", "Preis", "Gesamtmenge", "Menge",
    "Preis UE", "Menge UE", "Summe", "Seite", "von", "Gesamtsumme",
];
const ES: [&str; 20] = [
    "Numero", "Fecha", "Vencimiento", "Hora", "Fecha de pago", "Metodo de pago", "Periodo",
    "Orden de compra", "Nuestros datos", "Facturar a", "Producto", "Precio", "Cant. total",
    "Cant.", "Precio HE", "Cant. HE", "Total", "Pagina", "de", "Total general",
];
const IT: [&str; 20] = [
    "Numero", "Data", "Scadenza", "Ora", "Data di pagamento", "Metodo di pagamento", "Periodo",
    "Ordine d'acquisto", "Le nostre informazioni", "Fatturare a", "Prodotto", "Prezzo",
    "Qta totale", "Qta", "Prezzo straord.", "Qta straord.", "Totale", "Pagina", "di",
    "Totale generale",
];

/// Active key → label table.
#[derive(Clone, Debug)]
pub struct Language {
    code: String,
    labels: HashMap<Label, String>,
}

impl Language {
    fn from_table(code: &str, table: &[&str; 20]) -> Self {
        let labels = Label::ALL
            .into_iter()
            .zip(table.iter())
            .map(|(l, s)| (l, s.to_string()))
            .collect();
        Self {
            code: code.to_string(),
            labels,
        }
    }

    pub fn english() -> Self {
        Self::from_table("en", &EN)
    }

    /// ISO 639-1 code, e.g. `"nl"` or `"de-CH"`; only the primary subtag is used.
    pub fn from_code(code: &str) -> Option<Self> {
        let primary = code
            .split(['-', '_'])
            .next()
            .unwrap_or(code)
            .to_ascii_lowercase();
        let table = match primary.as_str() {
            "en" => &EN,
            "nl" => &NL,
            "fr" => &FR,
            "de" => &DE,
            "es" => &ES,
            "it" => &IT,
            _ => return None,
        };
        Some(Self::from_table(&primary, table))
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn get(&self, label: Label) -> &str {
        self.labels.get(&label).map(String::as_str).unwrap_or_else(|| label.key())
    }

    pub fn set(&mut self, label: Label, text: impl Into<String>) {
        self.labels.insert(label, text.into());
    }

    /// "Page 2 of 5"
    pub fn page_of(&self, page: usize, total: usize) -> String {
        format!(
            "{} {} {} {}",
            self.get(Label::Page),
            page,
            self.get(Label::PageOf),
            total
        )
    }
}

impl Default for Language {
    fn default() -> Self {
        Self::english()
    }
}
