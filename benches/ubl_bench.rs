use chrono::NaiveDate;
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rust_decimal_macros::dec;

use anaf::core::*;
use anaf::ubl;

fn test_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
}

fn build_invoice(lines: usize, currency: &str) -> Invoice {
    let mut builder = InvoiceBuilder::new("BENCH-001", test_date())
        .currency(currency)
        .seller(
            PartyBuilder::new("Benchmark SRL", "RO273663")
                .address("Str. Lunga 1", "Bucuresti", "010101", "RO-B", "RO")
                .iban("RO49AAAA1B31007593840000")
                .build(),
        )
        .buyer(
            PartyBuilder::new("Client SA", "14399840")
                .address("Bd. Unirii 5", "Cluj-Napoca", "400001", "RO-CJ", "RO")
                .build(),
        );

    for i in 1..=lines {
        builder = builder.add_line(
            LineItemBuilder::new(format!("Service item {i}"), dec!(5), dec!(100.00), dec!(500.00))
                .vat_percent(dec!(19))
                .build(),
        );
    }
    let net = dec!(500.00) * rust_decimal::Decimal::from(lines);
    builder
        .totals(net, net * dec!(0.19), net * dec!(1.19))
        .build()
        .unwrap()
}

fn bench_ubl(c: &mut Criterion) {
    let small = build_invoice(10, "RON");
    let large = build_invoice(1000, "EUR");

    c.bench_function("ubl_10_lines", |b| {
        b.iter(|| ubl::to_ubl_xml(black_box(&small)).unwrap())
    });
    c.bench_function("ubl_1000_lines", |b| {
        b.iter(|| ubl::to_ubl_xml(black_box(&large)).unwrap())
    });
}

fn bench_builder(c: &mut Criterion) {
    c.bench_function("build_10_line_invoice", |b| {
        b.iter(|| build_invoice(black_box(10), "RON"))
    });
}

criterion_group!(benches, bench_ubl, bench_builder);
criterion_main!(benches);
