pub mod actor;
pub mod genre;
pub mod performance;
pub mod play;
pub mod reservation;
pub mod theatre_hall;
pub mod ticket;
pub mod user;

pub use actor::{Actor, ActorDetail, ActorPayload};
pub use genre::{Genre, GenreDetail, GenrePayload};
pub use performance::{Performance, PerformancePayload, PerformanceSeating, PerformanceSummary};
pub use play::{Play, PlayDetail, PlayPayload};
pub use reservation::{CreateReservation, Reservation, ReservationDetail, SeatRequest};
pub use theatre_hall::{TheatreHall, TheatreHallPayload, TheatreHallResponse};
pub use ticket::{Ticket, TicketUpdate};
pub use user::{AccessToken, RefreshRequest, RegisterPayload, TokenPair, TokenRequest, User, UserSummary};
