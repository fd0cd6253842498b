//! Projection between external (dto) and stored (record) representations.

/// Bidirectional projection for one dto/record pair.
pub trait Mapper<D, R>: Send + Sync {
    /// Builds a record from an incoming dto.
    fn to_record(&self, dto: D) -> R;

    /// Projects a stored record outward.
    fn to_dto(&self, record: &R) -> D;
}

/// Maps through `From` conversions in both directions.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConvertMapper;

impl<D, R> Mapper<D, R> for ConvertMapper
where
    R: From<D>,
    D: for<'a> From<&'a R>,
{
    fn to_record(&self, dto: D) -> R {
        R::from(dto)
    }

    fn to_dto(&self, record: &R) -> D {
        D::from(record)
    }
}

/// Exposes records as their own dto.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityMapper;

impl<R: Clone> Mapper<R, R> for IdentityMapper {
    fn to_record(&self, dto: R) -> R {
        dto
    }

    fn to_dto(&self, record: &R) -> R {
        record.clone()
    }
}
