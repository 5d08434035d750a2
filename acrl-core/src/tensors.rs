use candle_core::Tensor;
use derive_more::{Deref, DerefMut};

#[derive(Deref, DerefMut, Debug)]
pub struct Returns(pub Tensor);

#[derive(Deref, DerefMut, Debug)]
pub struct Advantages(pub Tensor);

#[derive(Deref, DerefMut, Debug)]
pub struct Logps(pub Tensor);

#[derive(Deref, DerefMut, Debug)]
pub struct ValuesPred(pub Tensor);

#[derive(Deref, DerefMut, Debug)]
pub struct PolicyLoss(pub Tensor);

#[derive(Deref, DerefMut, Debug)]
pub struct ValueLoss(pub Tensor);
