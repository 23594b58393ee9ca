#![allow(dead_code)]

use querycrate::schema::{ColumnDef as Field, Persistent};
use sea_orm::{
    ConnectionTrait, Database, DatabaseConnection, DbErr, FromQueryResult, QueryResult,
};
use sea_orm_migration::prelude::*;

/// Seeded rows: `(id, name, description, status, amount, created, tenant)`
pub const ORDERS: [(i64, &str, Option<&str>, &str, i64, &str, i64); 7] = [
    (1, "Blue widget", Some("A small blue widget"), "ACTIVE", 100, "2024-01-01", 1),
    (2, "Red widget", Some("Now 50% off"), "ACTIVE", 250, "2024-01-02", 1),
    (3, "Green gadget", None, "PENDING", 75, "2024-01-03", 1),
    (4, "Blue gadget", Some("Large"), "CLOSED", 500, "2024-01-04", 2),
    (5, "Yellow thing", Some("blue trim"), "ACTIVE", 20, "2024-01-05", 2),
    (6, "Black box", Some("plain"), "PENDING", 300, "2024-01-06", 2),
    (7, "White box", Some("plain"), "ACTIVE", 150, "2024-01-07", 2),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub amount: i64,
    pub created_at: String,
    pub tenant: i64,
}

impl FromQueryResult for Order {
    fn from_query_result(res: &QueryResult, pre: &str) -> Result<Self, DbErr> {
        Ok(Self {
            id: res.try_get(pre, "ORDER_ID")?,
            name: res.try_get(pre, "NAME")?,
            description: res.try_get(pre, "DESCRIPTION")?,
            status: res.try_get(pre, "STATUS_CD")?,
            amount: res.try_get(pre, "AMOUNT")?,
            created_at: res.try_get(pre, "CREATE_TIME")?,
            tenant: res.try_get(pre, "TENANT_ID")?,
        })
    }
}

impl Persistent for Order {
    const TABLE_NAME: &'static str = "ORDERS";

    fn columns() -> Vec<Field> {
        vec![
            Field::new("id").column("ORDER_ID").key(),
            Field::new("name").column("NAME").keyword(),
            Field::new("description").column("DESCRIPTION").keyword(),
            Field::new("status").column("STATUS_CD"),
            Field::new("amount").column("AMOUNT"),
            Field::new("createdAt").column("CREATE_TIME"),
            Field::new("tenant").column("TENANT_ID"),
        ]
    }
}

/// Entity over the same table without keyword columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderStatus {
    pub id: i64,
    pub status: String,
}

impl FromQueryResult for OrderStatus {
    fn from_query_result(res: &QueryResult, pre: &str) -> Result<Self, DbErr> {
        Ok(Self {
            id: res.try_get(pre, "ORDER_ID")?,
            status: res.try_get(pre, "STATUS_CD")?,
        })
    }
}

impl Persistent for OrderStatus {
    const TABLE_NAME: &'static str = "ORDERS";

    fn columns() -> Vec<Field> {
        vec![
            Field::new("id").column("ORDER_ID"),
            Field::new("status").column("STATUS_CD"),
        ]
    }
}

pub fn ids(orders: &[Order]) -> Vec<i64> {
    orders.iter().map(|order| order.id).collect()
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    init_tracing();
    let db = Database::connect("sqlite::memory:").await?;

    Migrator::up(&db, None).await?;

    Ok(db)
}

pub async fn setup_test_db_with_orders() -> Result<DatabaseConnection, DbErr> {
    let db = setup_test_db().await?;

    for (id, name, description, status, amount, created, tenant) in ORDERS {
        let description = description.map_or_else(|| "NULL".to_string(), |d| format!("'{d}'"));
        db.execute_unprepared(&format!(
            "INSERT INTO ORDERS (ORDER_ID, NAME, DESCRIPTION, STATUS_CD, AMOUNT, CREATE_TIME, TENANT_ID) \
             VALUES ({id}, '{name}', {description}, '{status}', {amount}, '{created}', {tenant})"
        ))
        .await?;
    }

    Ok(db)
}

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(CreateOrdersTable)]
    }
}

pub struct CreateOrdersTable;

impl MigrationName for CreateOrdersTable {
    fn name(&self) -> &'static str {
        "m20240101_000001_create_orders_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for CreateOrdersTable {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let table = Table::create()
            .table(OrdersTable)
            .if_not_exists()
            .col(
                ColumnDef::new(OrderColumn::Id)
                    .big_integer()
                    .not_null()
                    .primary_key(),
            )
            .col(ColumnDef::new(OrderColumn::Name).string().not_null())
            .col(ColumnDef::new(OrderColumn::Description).string().null())
            .col(ColumnDef::new(OrderColumn::Status).string().not_null())
            .col(ColumnDef::new(OrderColumn::Amount).big_integer().not_null())
            .col(ColumnDef::new(OrderColumn::CreatedAt).string().not_null())
            .col(ColumnDef::new(OrderColumn::Tenant).big_integer().not_null())
            .to_owned();

        manager.create_table(table).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OrdersTable).to_owned())
            .await
    }
}

#[derive(Debug)]
pub enum OrderColumn {
    Id,
    Name,
    Description,
    Status,
    Amount,
    CreatedAt,
    Tenant,
}

impl Iden for OrderColumn {
    fn unquoted(&self, s: &mut dyn std::fmt::Write) {
        write!(
            s,
            "{}",
            match self {
                Self::Id => "ORDER_ID",
                Self::Name => "NAME",
                Self::Description => "DESCRIPTION",
                Self::Status => "STATUS_CD",
                Self::Amount => "AMOUNT",
                Self::CreatedAt => "CREATE_TIME",
                Self::Tenant => "TENANT_ID",
            }
        )
        .unwrap();
    }
}

#[derive(Debug)]
pub struct OrdersTable;

impl Iden for OrdersTable {
    fn unquoted(&self, s: &mut dyn std::fmt::Write) {
        write!(s, "ORDERS").unwrap();
    }
}
