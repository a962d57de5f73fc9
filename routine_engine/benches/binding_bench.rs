use criterion::{black_box, criterion_group, criterion_main, Criterion};
use routine_engine::binding::{bind, layout};
use routine_engine::engine::scripted::{ScriptedExecutor, ScriptedResultSet};
use routine_engine::metadata::{bindings_for, resolve};
use routine_engine::{
    unknown_field, Describe, FieldDecl, FieldInput, FieldValue, ProcedureDescriptor, Record,
    Result, RoutineCaller, SqlValue, TypeDecl,
};

#[derive(Debug, Default, Clone)]
struct Line {
    sku: String,
    quantity: i32,
}

impl Describe for Line {
    fn describe() -> TypeDecl {
        TypeDecl::of::<Line>()
            .table_name("LineType")
            .field(FieldDecl::new("sku").name("Sku"))
            .field(FieldDecl::new("quantity").name("Quantity").ordinal(0))
    }
}

impl Record for Line {
    fn read_field(&self, field: &str) -> Result<FieldValue<'_>> {
        match field {
            "sku" => Ok(FieldValue::scalar(self.sku.as_str())),
            "quantity" => Ok(FieldValue::scalar(self.quantity)),
            _ => Err(unknown_field("Line", field)),
        }
    }

    fn write_field(&mut self, field: &str, input: FieldInput) -> Result<()> {
        match field {
            "sku" => self.sku = input.into_value()?,
            "quantity" => self.quantity = input.into_value()?,
            _ => return Err(unknown_field("Line", field)),
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct Params {
    id: i32,
    lines: Vec<Line>,
}

impl Describe for Params {
    fn describe() -> TypeDecl {
        TypeDecl::of::<Params>()
            .field(FieldDecl::new("id").name("Id"))
            .field(FieldDecl::new("lines").name("Lines").table_of::<Line>())
    }
}

impl Record for Params {
    fn read_field(&self, field: &str) -> Result<FieldValue<'_>> {
        match field {
            "id" => Ok(FieldValue::scalar(self.id)),
            "lines" => Ok(FieldValue::rows(&self.lines)),
            _ => Err(unknown_field("Params", field)),
        }
    }

    fn write_field(&mut self, field: &str, input: FieldInput) -> Result<()> {
        match field {
            "id" => self.id = input.into_value()?,
            _ => return Err(unknown_field("Params", field)),
        }
        Ok(())
    }
}

fn lines(n: i32) -> Vec<Line> {
    (0..n)
        .map(|i| Line {
            sku: format!("SKU-{}", i),
            quantity: i,
        })
        .collect()
}

fn benchmark_resolve_uncached(c: &mut Criterion) {
    let decl = Params::describe();
    c.bench_function("resolve_uncached", |b| {
        b.iter(|| black_box(resolve(black_box(&decl))))
    });
}

fn benchmark_resolve_cached(c: &mut Criterion) {
    c.bench_function("resolve_cached", |b| {
        b.iter(|| black_box(bindings_for::<Params>()))
    });
}

fn benchmark_layout(c: &mut Criterion) {
    let items: Vec<(usize, Option<usize>)> = (0..64)
        .map(|i| (i, if i % 8 == 0 { Some(i / 2) } else { None }))
        .collect();
    c.bench_function("layout_64_items", |b| {
        b.iter(|| {
            black_box(layout(
                black_box(items.clone()),
                |item| item.1,
                |item| item.0.to_string(),
            ))
        })
    });
}

fn benchmark_bind_table_value(c: &mut Criterion) {
    let bindings = bindings_for::<Params>().expect("bindings");
    let params = Params {
        id: 1,
        lines: lines(1000),
    };
    c.bench_function("bind_table_value_1000_rows", |b| {
        b.iter(|| black_box(bind(Some(black_box(&params) as &dyn Record), &bindings)))
    });
}

fn benchmark_materialize(c: &mut Criterion) {
    let caller = RoutineCaller::default();
    let set = (0..1000).fold(ScriptedResultSet::new(&["Quantity", "Sku"]), |set, i| {
        set.row(vec![SqlValue::Integer(i), SqlValue::String(format!("SKU-{}", i))])
    });
    let descriptor = ProcedureDescriptor::new("GetLines").returns::<Line>();
    c.bench_function("materialize_1000_rows", |b| {
        b.iter(|| {
            let mut executor = ScriptedExecutor::new().with_result_set(set.clone());
            black_box(caller.call_without_params(&mut executor, &descriptor))
        })
    });
}

criterion_group!(
    benches,
    benchmark_resolve_uncached,
    benchmark_resolve_cached,
    benchmark_layout,
    benchmark_bind_table_value,
    benchmark_materialize
);
criterion_main!(benches);
