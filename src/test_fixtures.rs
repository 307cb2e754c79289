use crate::{
    db::{
        Db,
        codec::{PayloadDecoder, PayloadEncoder},
    },
    error::InternalError,
    store::{MemoryStore, TableStore},
    traits::{Entity, FieldKind, FieldModel},
    value::Value,
};

///
/// Test fixtures
///
/// A small order-management schema exercising every field shape: scalar
/// primary keys, a secondary index, a single-valued reference, and a
/// multi-valued reference list.
///

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Customer {
    pub id: i64,
    pub region: String,
    pub active: bool,
}

impl Entity for Customer {
    const NAME: &'static str = "customer";
    const FIELDS: &'static [FieldModel] = &[
        FieldModel::primary_key("id", FieldKind::Int),
        FieldModel::indexed("region", FieldKind::Text),
        FieldModel::plain("active", FieldKind::Bool),
    ];

    fn key(&self) -> Value {
        Value::Int(self.id)
    }

    fn encode(&self, enc: &mut PayloadEncoder) {
        enc.scalar("id", self.id);
        enc.scalar("region", self.region.as_str());
        enc.scalar("active", self.active);
    }

    fn decode<S: TableStore>(dec: &PayloadDecoder<'_, S>) -> Result<Self, InternalError> {
        Ok(Self {
            id: dec.int("id")?,
            region: dec.text("region")?,
            active: dec.bool("active")?,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Item {
    pub sku: String,
    pub price: f64,
}

impl Entity for Item {
    const NAME: &'static str = "item";
    const FIELDS: &'static [FieldModel] = &[
        FieldModel::primary_key("sku", FieldKind::Text),
        FieldModel::plain("price", FieldKind::Float),
    ];

    fn key(&self) -> Value {
        Value::Text(self.sku.clone())
    }

    fn encode(&self, enc: &mut PayloadEncoder) {
        enc.scalar("sku", self.sku.as_str());
        enc.scalar("price", self.price);
    }

    fn decode<S: TableStore>(dec: &PayloadDecoder<'_, S>) -> Result<Self, InternalError> {
        Ok(Self {
            sku: dec.text("sku")?,
            price: dec.float("price")?,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Order {
    pub id: i64,
    pub status: String,
    pub qty: i64,
    pub customer: Customer,
    pub items: Vec<Item>,
}

impl Entity for Order {
    const NAME: &'static str = "order";
    const FIELDS: &'static [FieldModel] = &[
        FieldModel::primary_key("id", FieldKind::Int),
        FieldModel::indexed("status", FieldKind::Text),
        FieldModel::plain("qty", FieldKind::Int),
        FieldModel::plain("customer", FieldKind::Ref),
        FieldModel::plain("items", FieldKind::RefList),
    ];

    fn key(&self) -> Value {
        Value::Int(self.id)
    }

    fn encode(&self, enc: &mut PayloadEncoder) {
        enc.scalar("id", self.id);
        enc.scalar("status", self.status.as_str());
        enc.scalar("qty", self.qty);
        enc.reference("customer", &self.customer);
        enc.reference_list("items", &self.items);
    }

    fn decode<S: TableStore>(dec: &PayloadDecoder<'_, S>) -> Result<Self, InternalError> {
        Ok(Self {
            id: dec.int("id")?,
            status: dec.text("status")?,
            qty: dec.int("qty")?,
            customer: dec.reference("customer")?,
            items: dec.reference_list("items")?,
        })
    }
}

pub(crate) fn customer(id: i64, region: &str) -> Customer {
    Customer {
        id,
        region: region.to_string(),
        active: true,
    }
}

pub(crate) fn item(sku: &str, price: f64) -> Item {
    Item {
        sku: sku.to_string(),
        price,
    }
}

pub(crate) fn order(id: i64, status: &str, qty: i64, customer: Customer, items: Vec<Item>) -> Order {
    Order {
        id,
        status: status.to_string(),
        qty,
        customer,
        items,
    }
}

/// A database seeded the way a caller would: referenced records persisted
/// before their parents.
pub(crate) fn seeded_db() -> Db<MemoryStore> {
    let mut db = Db::open(MemoryStore::new()).expect("open");

    let alice = customer(1, "north");
    let bob = customer(2, "south");
    let widget = item("widget", 2.5);
    let gadget = item("gadget", 10.0);

    for c in [&alice, &bob] {
        assert!(db.insert(c).expect("insert customer"));
    }
    for i in [&widget, &gadget] {
        assert!(db.insert(i).expect("insert item"));
    }

    let orders = [
        order(1, "open", 1, alice.clone(), vec![widget.clone()]),
        order(2, "open", 2, alice.clone(), vec![widget.clone(), gadget.clone()]),
        order(3, "closed", 2, bob.clone(), vec![gadget.clone()]),
        order(4, "open", 3, bob.clone(), vec![]),
        order(5, "shipped", 2, alice, vec![widget, gadget]),
    ];
    for o in &orders {
        assert!(db.insert(o).expect("insert order"));
    }

    db
}
