use routine_engine::{
    unknown_field, DbType, Describe, Direction, FieldDecl, FieldInput, FieldValue, Record, Result,
    SinkStream, TypeDecl,
};
use std::path::PathBuf;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Customer {
    pub id: i32,
    pub name: String,
    pub email: Option<String>,
}

impl Describe for Customer {
    fn describe() -> TypeDecl {
        TypeDecl::of::<Customer>()
            .field(FieldDecl::new("id").name("CustomerId").ordinal(0))
            .field(FieldDecl::new("name"))
            .field(FieldDecl::new("email").optional_in_result())
    }
}

impl Record for Customer {
    fn read_field(&self, field: &str) -> Result<FieldValue<'_>> {
        match field {
            "id" => Ok(FieldValue::scalar(self.id)),
            "name" => Ok(FieldValue::scalar(self.name.as_str())),
            "email" => Ok(FieldValue::scalar(self.email.clone())),
            _ => Err(unknown_field("Customer", field)),
        }
    }

    fn write_field(&mut self, field: &str, input: FieldInput) -> Result<()> {
        match field {
            "id" => self.id = input.into_value()?,
            "name" => self.name = input.into_value()?,
            "email" => self.email = input.into_value()?,
            _ => return Err(unknown_field("Customer", field)),
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Order {
    pub order_id: i64,
    pub customer_id: i32,
    pub total: f64,
}

impl Describe for Order {
    fn describe() -> TypeDecl {
        TypeDecl::of::<Order>()
            .field(FieldDecl::new("order_id").name("OrderId"))
            .field(FieldDecl::new("customer_id").name("CustomerId"))
            .field(FieldDecl::new("total").name("Total"))
    }
}

impl Record for Order {
    fn read_field(&self, field: &str) -> Result<FieldValue<'_>> {
        match field {
            "order_id" => Ok(FieldValue::scalar(self.order_id)),
            "customer_id" => Ok(FieldValue::scalar(self.customer_id)),
            "total" => Ok(FieldValue::scalar(self.total)),
            _ => Err(unknown_field("Order", field)),
        }
    }

    fn write_field(&mut self, field: &str, input: FieldInput) -> Result<()> {
        match field {
            "order_id" => self.order_id = input.into_value()?,
            "customer_id" => self.customer_id = input.into_value()?,
            "total" => self.total = input.into_value()?,
            _ => return Err(unknown_field("Order", field)),
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct AuditEntry {
    pub message: String,
}

impl Describe for AuditEntry {
    fn describe() -> TypeDecl {
        TypeDecl::of::<AuditEntry>().field(FieldDecl::new("message").name("Message"))
    }
}

impl Record for AuditEntry {
    fn read_field(&self, field: &str) -> Result<FieldValue<'_>> {
        match field {
            "message" => Ok(FieldValue::scalar(self.message.as_str())),
            _ => Err(unknown_field("AuditEntry", field)),
        }
    }

    fn write_field(&mut self, field: &str, input: FieldInput) -> Result<()> {
        match field {
            "message" => self.message = input.into_value()?,
            _ => return Err(unknown_field("AuditEntry", field)),
        }
        Ok(())
    }
}

/// Element of the `sales.OrderLineType` table-valued parameter.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct OrderLine {
    pub sku: String,
    pub quantity: i32,
    pub price: String,
}

impl Describe for OrderLine {
    fn describe() -> TypeDecl {
        TypeDecl::of::<OrderLine>()
            .schema("sales")
            .table_name("OrderLineType")
            .field(FieldDecl::new("sku").name("Sku").db_type(DbType::VarChar).size(20))
            .field(FieldDecl::new("quantity").name("Quantity"))
            .field(
                FieldDecl::new("price")
                    .name("Price")
                    .db_type(DbType::Decimal)
                    .precision(12)
                    .ordinal(0),
            )
    }
}

impl Record for OrderLine {
    fn read_field(&self, field: &str) -> Result<FieldValue<'_>> {
        match field {
            "sku" => Ok(FieldValue::scalar(self.sku.as_str())),
            "quantity" => Ok(FieldValue::scalar(self.quantity)),
            "price" => Ok(FieldValue::Scalar(routine_engine::SqlValue::Decimal(
                self.price.clone(),
            ))),
            _ => Err(unknown_field("OrderLine", field)),
        }
    }

    fn write_field(&mut self, field: &str, input: FieldInput) -> Result<()> {
        match field {
            "sku" => self.sku = input.into_value()?,
            "quantity" => self.quantity = input.into_value()?,
            "price" => self.price = input.into_value()?,
            _ => return Err(unknown_field("OrderLine", field)),
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct SaveOrderParams {
    pub customer_id: i32,
    pub lines: Option<Vec<OrderLine>>,
    pub order_id: i64,
    pub status: Option<String>,
    pub note: String,
}

impl Describe for SaveOrderParams {
    fn describe() -> TypeDecl {
        TypeDecl::of::<SaveOrderParams>()
            .field(FieldDecl::new("customer_id").name("CustomerId"))
            .field(FieldDecl::new("lines").name("Lines").table_of::<OrderLine>())
            .field(FieldDecl::new("order_id").name("OrderId").output())
            .field(
                FieldDecl::new("status")
                    .name("Status")
                    .direction(Direction::InputOutput)
                    .db_type(DbType::NVarChar)
                    .size(10),
            )
            .field(FieldDecl::new("note").not_mapped())
    }
}

impl Record for SaveOrderParams {
    fn read_field(&self, field: &str) -> Result<FieldValue<'_>> {
        match field {
            "customer_id" => Ok(FieldValue::scalar(self.customer_id)),
            "lines" => Ok(FieldValue::optional_rows(self.lines.as_deref())),
            "order_id" => Ok(FieldValue::scalar(self.order_id)),
            "status" => Ok(FieldValue::scalar(self.status.clone())),
            "note" => Ok(FieldValue::scalar(self.note.as_str())),
            _ => Err(unknown_field("SaveOrderParams", field)),
        }
    }

    fn write_field(&mut self, field: &str, input: FieldInput) -> Result<()> {
        match field {
            "customer_id" => self.customer_id = input.into_value()?,
            "order_id" => self.order_id = input.into_value()?,
            "status" => self.status = input.into_value()?,
            _ => return Err(unknown_field("SaveOrderParams", field)),
        }
        Ok(())
    }
}

/// Parameters of a routine with a return value.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct StatusParams {
    pub code: String,
    pub return_value: Option<i32>,
}

impl Describe for StatusParams {
    fn describe() -> TypeDecl {
        TypeDecl::of::<StatusParams>()
            .field(FieldDecl::new("code").name("Code"))
            .field(
                FieldDecl::new("return_value")
                    .name("RETURN_VALUE")
                    .direction(Direction::ReturnValue),
            )
    }
}

impl Record for StatusParams {
    fn read_field(&self, field: &str) -> Result<FieldValue<'_>> {
        match field {
            "code" => Ok(FieldValue::scalar(self.code.as_str())),
            "return_value" => Ok(FieldValue::scalar(self.return_value)),
            _ => Err(unknown_field("StatusParams", field)),
        }
    }

    fn write_field(&mut self, field: &str, input: FieldInput) -> Result<()> {
        match field {
            "code" => self.code = input.into_value()?,
            "return_value" => self.return_value = input.into_value()?,
            _ => return Err(unknown_field("StatusParams", field)),
        }
        Ok(())
    }
}

/// Directory the `Document` content column is streamed into.
pub fn document_dir() -> PathBuf {
    std::env::temp_dir().join("routine_engine_documents")
}

/// Result row whose `Content` column is streamed into a file named by
/// `FileName`.
#[derive(Debug, Default)]
pub struct Document {
    pub file_name: String,
    pub content: Option<SinkStream>,
}

impl Describe for Document {
    fn describe() -> TypeDecl {
        TypeDecl::of::<Document>()
            .field(FieldDecl::new("file_name").name("FileName"))
            .field(FieldDecl::new("content").name("Content").stream_to_file(
                document_dir(),
                Some("file_name"),
                true,
                false,
            ))
    }
}

impl Record for Document {
    fn read_field(&self, field: &str) -> Result<FieldValue<'_>> {
        match field {
            "file_name" => Ok(FieldValue::scalar(self.file_name.as_str())),
            _ => Err(unknown_field("Document", field)),
        }
    }

    fn write_field(&mut self, field: &str, input: FieldInput) -> Result<()> {
        match field {
            "file_name" => self.file_name = input.into_value()?,
            "content" => self.content = Some(input.into_stream()?),
            _ => return Err(unknown_field("Document", field)),
        }
        Ok(())
    }
}
