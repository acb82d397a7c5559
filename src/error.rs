use derive_more::From;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, From)]
pub enum Error {
    // -- Modules
    #[from]
    Motor(crate::hw::motor::Error),
    #[from]
    Imu(crate::hw::imu::Error),

    // -- Externals
    #[from]
    Esp(esp_idf_svc::sys::EspError),
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::error::Error for Error {}
