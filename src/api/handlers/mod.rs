/// The question form: `GET /` and `POST /`.
pub mod form;
