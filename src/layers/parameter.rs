use crate::math::matrix::Matrix;

/// A trainable tensor together with the gradient accumulated by `backward`.
#[derive(Debug, Clone)]
pub struct Parameter {
    pub value: Matrix,
    pub grad: Matrix,
}

impl Parameter {
    pub fn new(value: Matrix) -> Parameter {
        let grad = Matrix::zeros(value.rows, value.cols);
        Parameter { value, grad }
    }

    pub fn zero_grad(&mut self) {
        self.grad = Matrix::zeros(self.value.rows, self.value.cols);
    }

    pub fn shape(&self) -> (usize, usize) {
        self.value.shape()
    }
}
