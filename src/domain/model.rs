// ドメインモデル（エンティティと値オブジェクト）

mod availability;
mod product_stock;
mod reservation;
mod value_objects;

pub use value_objects::{
    OrderId, ProductId, QuotationId, RentalPeriod, ReservationId, VariantId,
};

pub use availability::{Availability, DayAvailability};
pub use product_stock::ProductStock;
pub use reservation::{NewReservation, Reservation};
